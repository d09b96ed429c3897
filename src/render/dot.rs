//! Graphviz DOT writer.
//!
//! Machines, source and sink are drawn as HTML tables with one port per
//! ingredient so edges attach to the ingredient they carry. Edge labels sit
//! at the ports: `(2.31K/s)`, or `(102/t)` for EU.

use std::fmt;

use super::format::{ingredient_id, ingredient_label, quantity_label, round_readable, strip_brackets};
use super::palette::{scale_color, Palette};
use crate::config::{FlowConfig, Orientation};
use crate::graph::{Edge, FlowGraph, NodeId, NodeStyle};
use crate::postprocess::Summary;
use crate::recipe::IoDirection;

const SUMMARY_MARK: &str = "\u{2588} ";

/// Quote a string for DOT.
fn quote(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{}\"", escaped)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Port name of an ingredient on one side of a node.
pub fn port_id(ingredient: &str, direction: IoDirection) -> String {
    let prefix = match direction {
        IoDirection::Input => "i",
        IoDirection::Output => "o",
    };
    format!("{}_{}", prefix, ingredient.replace(' ', "_").to_lowercase().trim())
}

/// Compass sides where edges enter and leave a node.
fn port_sides(orientation: Orientation) -> (&'static str, &'static str) {
    match orientation {
        Orientation::TB => ("n", "s"),
        Orientation::BT => ("s", "n"),
        Orientation::LR => ("w", "e"),
        Orientation::RL => ("e", "w"),
    }
}

fn is_vertical(orientation: Orientation) -> bool {
    matches!(orientation, Orientation::TB | Orientation::BT)
}

fn unique(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// A graph ready to be written as DOT.
pub struct Dot<'a> {
    graph: &'a FlowGraph,
    summary: Option<&'a Summary>,
    config: &'a FlowConfig,
    title: &'a str,
    palette: Palette,
}

impl<'a> Dot<'a> {
    /// Prepare a graph for output. Summary rows take colours first, then
    /// edges in order.
    pub fn new(graph: &'a FlowGraph, summary: Option<&'a Summary>, config: &'a FlowConfig, title: &'a str) -> Self {
        let mut palette = Palette::new(config);
        if let Some(summary) = summary {
            for row in &summary.rows {
                palette.color(&row.id);
            }
        }
        for edge in graph.edges() {
            palette.color(&ingredient_id(&edge.key.ingredient));
        }
        Self {
            graph,
            summary,
            config,
            title,
            palette,
        }
    }

    /// Ingredients on the ports of a node's input and output sides.
    fn ports(&self, node: NodeId) -> (Vec<String>, Vec<String>) {
        let edges = self.graph.edges();
        match node {
            NodeId::Source => (
                Vec::new(),
                unique(edges.iter().filter(|e| e.key.from == node).map(|e| e.key.ingredient.clone())),
            ),
            NodeId::Sink => (
                unique(edges.iter().filter(|e| e.key.to == node).map(|e| e.key.ingredient.clone())),
                Vec::new(),
            ),
            NodeId::Recipe(_) => match self.graph.recipe(node) {
                Some(recipe) => (
                    unique(recipe.inputs.iter().map(|i| i.name.clone())),
                    unique(recipe.outputs.iter().map(|i| i.name.clone())),
                ),
                None => (Vec::new(), Vec::new()),
            },
            _ => (Vec::new(), Vec::new()),
        }
    }

    fn port_cell(&self, ingredient: &str, direction: IoDirection) -> String {
        format!(
            "<td border=\"1\" PORT=\"{}\">{}</td>",
            escape_html(&port_id(ingredient, direction)),
            escape_html(&strip_brackets(&ingredient_label(ingredient), self.config.strip_brackets))
        )
    }

    /// HTML table with the label between the input and output ports, or
    /// `None` for a node without ports.
    fn port_table(&self, label: &str, inputs: &[String], outputs: &[String]) -> Option<String> {
        if inputs.is_empty() && outputs.is_empty() {
            return None;
        }
        let machine_cell = label.lines().map(escape_html).collect::<Vec<_>>().join("<br />");

        let mut rows: Vec<Vec<String>> = Vec::new();
        if !inputs.is_empty() {
            rows.push(inputs.iter().map(|i| self.port_cell(i, IoDirection::Input)).collect());
        }
        rows.push(vec![format!("<td border=\"0\">{}</td>", machine_cell)]);
        if !outputs.is_empty() {
            rows.push(outputs.iter().map(|o| self.port_cell(o, IoDirection::Output)).collect());
        }
        if matches!(self.config.orientation, Orientation::BT | Orientation::RL) {
            rows.reverse();
        }

        let mut html = String::from("<<table border=\"0\" cellspacing=\"0\">");
        if is_vertical(self.config.orientation) {
            for cells in rows {
                html.push_str("<tr><td><table border=\"0\" cellspacing=\"0\"><tr>");
                html.push_str(&cells.concat());
                html.push_str("</tr></table></td></tr>");
            }
        } else {
            html.push_str("<tr>");
            for cells in rows {
                html.push_str("<td><table border=\"0\" cellspacing=\"0\">");
                for cell in cells {
                    html.push_str("<tr>");
                    html.push_str(&cell);
                    html.push_str("</tr>");
                }
                html.push_str("</table></td>");
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>>");
        Some(html)
    }

    fn summary_line(&self, label: &str, amount: &str, label_color: &str, amount_color: &str) -> String {
        let font = escape_html(&self.config.general_font);
        format!(
            "<tr><td align=\"left\"><font color=\"{}\" face=\"{}\">{}</font></td>\
             <td align=\"right\"><font color=\"{}\" face=\"{}\">{}</font></td></tr>",
            label_color,
            font,
            escape_html(&strip_brackets(label, self.config.strip_brackets)),
            amount_color,
            font,
            escape_html(amount)
        )
    }

    fn summary_table(&self, summary: &Summary) -> String {
        let config = self.config;
        let (positive, negative) = (config.positive_color.as_str(), config.negative_color.as_str());
        let sign_color = |value: f64| if value >= 0.0 { positive } else { negative };

        let mut html = format!(
            "<<table border=\"0\"><tr><td align=\"left\"><font color=\"white\" face=\"{}\"><b>Summary</b></font></td></tr><hr/>",
            escape_html(&config.general_font)
        );
        for row in &summary.rows {
            html.push_str(&self.summary_line(
                &format!("{}{}", SUMMARY_MARK, row.label),
                &quantity_label(&row.id, row.quantity),
                self.palette.get(&row.id),
                sign_color(row.quantity),
            ));
        }
        html.push_str("<hr/>");

        let unit = &summary.unit;
        html.push_str(&self.summary_line("Input EU/t:", &unit.format(summary.input_eut), "white", negative));
        if let (Some(output), Some(net)) = (summary.output_eut, summary.net_eut()) {
            html.push_str(&self.summary_line("Output EU/t:", &unit.format(output), "white", positive));
            html.push_str(&self.summary_line("Net EU/t:", &unit.format(net), "white", sign_color(net)));
            html.push_str("<hr/>");
        }
        html.push_str(&self.summary_line(
            "Total machine count:",
            &round_readable(summary.machine_count),
            "white",
            positive,
        ));
        html.push_str(&self.summary_line(
            "Peak power draw:",
            &format!("{}A {}", summary.peak_draw, summary.peak_tier),
            "white",
            negative,
        ));
        html.push_str("</table>>");
        html
    }

    /// Colour of a joint node: the ingredient it merges.
    fn joint_color(&self, node: NodeId) -> Option<&str> {
        self.graph
            .edges()
            .iter()
            .find(|e| e.key.from == node || e.key.to == node)
            .map(|e| self.palette.get(&ingredient_id(&e.key.ingredient)))
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, node: NodeId, style: &NodeStyle) -> fmt::Result {
        let mut attrs: Vec<(&str, String)> = Vec::new();

        let (inputs, outputs) = self.ports(node);
        let table = match (node, self.summary) {
            (NodeId::Summary, Some(summary)) => Some(self.summary_table(summary)),
            _ => self.port_table(&style.label, &inputs, &outputs),
        };
        match table {
            Some(html) => {
                attrs.push(("label", html));
                if node.has_ports() {
                    attrs.push(("shape", "plain".to_string()));
                }
            }
            None => attrs.push(("label", quote(&style.label))),
        }

        if let Some(fill) = &style.fillcolor {
            attrs.push(("fillcolor", quote(fill)));
        }
        let color = match (node, &style.color) {
            (_, Some(color)) => Some(color.as_str()),
            (NodeId::Joint { .. }, None) => self.joint_color(node),
            _ => None,
        };
        if let Some(color) = color {
            attrs.push(("color", quote(color)));
        }
        if !node.has_ports() {
            if let Some(shape) = &style.shape {
                attrs.push(("shape", quote(shape)));
            }
        }

        let attrs: Vec<String> = attrs.into_iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        writeln!(f, "    {} [{}];", quote(&node.to_string()), attrs.join(", "))
    }

    fn write_edge(&self, f: &mut fmt::Formatter<'_>, edge: &Edge) -> fmt::Result {
        let key = &edge.key;
        let (in_side, out_side) = port_sides(self.config.orientation);
        let vertical = is_vertical(self.config.orientation);

        let id = ingredient_id(&key.ingredient);
        let color = self.palette.get(&id);
        let label = format!("({})", quantity_label(&id, edge.quantity));

        let from = if key.from.has_ports() {
            format!(
                "{}:{}:{}",
                quote(&key.from.to_string()),
                quote(&port_id(&key.ingredient, IoDirection::Output)),
                out_side
            )
        } else {
            quote(&key.from.to_string())
        };
        let to = if key.to.has_ports() {
            format!(
                "{}:{}:{}",
                quote(&key.to.to_string()),
                quote(&port_id(&key.ingredient, IoDirection::Input)),
                in_side
            )
        } else {
            quote(&key.to.to_string())
        };

        let mut attrs: Vec<(&str, String)> = vec![
            ("color", quote(color)),
            ("fontcolor", quote(&scale_color(color, 1.5))),
            ("labeldistance", quote(if vertical { "2.5" } else { "4" })),
            ("labelangle", quote(if vertical { "60" } else { "20" })),
        ];
        let with_debug = |debug: &Option<String>| match debug {
            Some(name) => format!("{}\n{}", label, name),
            None => label.clone(),
        };
        if key.to.has_ports() {
            attrs.push(("arrowhead", "normal".to_string()));
            attrs.push(("headlabel", quote(&with_debug(&edge.debug_head))));
        }
        if key.from.has_ports() {
            attrs.push(("arrowtail", "tee".to_string()));
            attrs.push(("taillabel", quote(&with_debug(&edge.debug_tail))));
        }
        let joint = |node: NodeId, dir: IoDirection| matches!(node, NodeId::Joint { direction, .. } if direction == dir);
        if key.from.has_ports() && joint(key.to, IoDirection::Output) {
            attrs.push(("headlabel", quote(&label)));
        }
        if joint(key.from, IoDirection::Input) && key.to.has_ports() {
            attrs.push(("taillabel", quote(&label)));
        }

        let attrs: Vec<String> = attrs.into_iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        writeln!(f, "    {} -> {} [{}];", from, to, attrs.join(", "))
    }
}

impl fmt::Display for Dot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.config;
        writeln!(f, "digraph {} {{", quote(self.title))?;
        writeln!(
            f,
            "    graph [bgcolor={}, rankdir={}, label={}, labelloc=\"t\", fontname={}, fontcolor={}];",
            quote(&config.background_color),
            config.orientation.as_str(),
            quote(self.title),
            quote(&config.general_font),
            quote(&config.title_color)
        )?;
        writeln!(
            f,
            "    node [style=\"filled\", fontname={}, fontsize=\"{}\"];",
            quote(&config.general_font),
            config.node_fontsize
        )?;
        writeln!(
            f,
            "    edge [fontname={}, fontsize=\"{}\", dir=\"both\", arrowtail=\"none\", arrowhead=\"none\", penwidth=\"1\"];",
            quote(&config.general_font),
            config.edge_fontsize
        )?;

        for (node, style) in self.graph.nodes() {
            self.write_node(f, node, style)?;
        }
        for edge in self.graph.edges() {
            self.write_edge(f, edge)?;
        }
        writeln!(f, "}}")
    }
}

/// Render a graph, with its summary when there is one, as DOT text.
pub fn to_dot(graph: &FlowGraph, summary: Option<&Summary>, config: &FlowConfig, title: &str) -> String {
    Dot::new(graph, summary, config, title).to_string()
}
