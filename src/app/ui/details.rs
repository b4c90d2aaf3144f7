use eframe::egui::{self, RichText, Ui};
use serde_json::{Map, Value};

use crate::api::NOT_SPECIFIED;
use crate::graph::NodeKind;
use crate::util::format_count;

use super::super::{NodeDetailState, ViewModel};

fn attribute_text(attributes: &Map<String, Value>, key: &str) -> String {
    match attributes.get(key) {
        Some(Value::String(text)) if !text.is_empty() => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => NOT_SPECIFIED.to_string(),
    }
}

fn attribute_count_text(attributes: &Map<String, Value>, key: &str) -> String {
    let count = match attributes.get(key) {
        Some(Value::Number(number)) => number.as_u64(),
        Some(Value::String(text)) => text.parse().ok(),
        _ => None,
    };
    count.map(format_count).unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

fn draw_attributes(ui: &mut Ui, kind: NodeKind, attributes: &Map<String, Value>, node_id: &str) {
    match kind {
        NodeKind::User => {
            ui.label(format!("Login: {}", attribute_text(attributes, "login")));
            ui.label(format!("City: {}", attribute_text(attributes, "city")));
            ui.label(format!("Sex: {}", attribute_text(attributes, "sex")));
            ui.label(format!(
                "Followers: {}",
                attribute_count_text(attributes, "followers")
            ));
            ui.label(format!(
                "Subscriptions: {}",
                attribute_count_text(attributes, "subscriptions")
            ));
        }
        NodeKind::Group => {
            ui.label(format!("Login: {}", attribute_text(attributes, "login")));
            ui.label(format!("Id: {node_id}"));
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Node Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click a node in the graph or a ranking entry.");
            return;
        };

        let Some(index) = self.graph.index_of(&selected_id) else {
            ui.label("The selected node is not part of the current graph.");
            return;
        };

        let node = &self.graph.nodes[index];
        // The fetched detail may carry a fresher name than the graph copy.
        let display_name = match &self.detail {
            NodeDetailState::Ready(detail) => detail.name.clone(),
            _ => node.name.clone(),
        };
        ui.label(RichText::new(display_name).strong());
        ui.small(selected_id.as_str());
        ui.label(format!("Type: {}", node.kind.label()));
        ui.add_space(6.0);

        let mut pending_selection: Option<String> = None;

        match &self.detail {
            NodeDetailState::Ready(detail) => {
                draw_attributes(ui, detail.kind, &detail.attributes, &selected_id);

                ui.separator();
                ui.label(RichText::new("Relationships").strong());
                if detail.relations.is_empty() {
                    ui.label("No outgoing relationships.");
                }
                for relation in &detail.relations {
                    let label = format!("{}  \u{2192}  {}", relation.kind, relation.target_name);
                    let linked_target = relation
                        .target_id
                        .as_deref()
                        .filter(|target| self.graph.index_of(target).is_some());

                    match linked_target {
                        Some(target) => {
                            if ui.link(label).on_hover_text(target).clicked() {
                                pending_selection = Some(target.to_string());
                            }
                        }
                        None => {
                            ui.label(label);
                        }
                    }
                }
            }
            NodeDetailState::Loading { .. } => {
                draw_attributes(ui, node.kind, &node.attributes, &selected_id);
                ui.separator();
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Fetching node detail...");
                });
            }
            NodeDetailState::Unavailable => {
                draw_attributes(ui, node.kind, &node.attributes, &selected_id);
                ui.separator();
                ui.label("No data for this node.");
            }
            NodeDetailState::Idle => {
                draw_attributes(ui, node.kind, &node.attributes, &selected_id);
            }
        }

        ui.separator();
        ui.label(RichText::new("Adjacent nodes").strong());
        let neighbors = self.graph.neighbors(index);
        if neighbors.is_empty() {
            ui.label("No adjacent nodes.");
        } else {
            egui::ScrollArea::vertical()
                .id_salt("adjacent_nodes_scroll")
                .max_height(260.0)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for neighbor in neighbors {
                        let neighbor_node = &self.graph.nodes[neighbor];
                        let label =
                            format!("{}  ({})", neighbor_node.name, neighbor_node.kind.label());
                        if ui
                            .link(label)
                            .on_hover_text(neighbor_node.id.as_str())
                            .clicked()
                        {
                            pending_selection = Some(neighbor_node.id.clone());
                        }
                    }
                });
        }

        if let Some(id) = pending_selection {
            self.set_selected(Some(id));
        }
    }
}
