//! Ingredient colours.

use std::collections::HashMap;

use crate::config::FlowConfig;

const PLAIN: &str = "#ffffff";

/// Assigns each ingredient id the next colour of a cycle, once.
#[derive(Debug, Clone)]
pub struct Palette {
    cycle: Vec<String>,
    next: usize,
    assigned: HashMap<String, String>,
}

impl Palette {
    /// Rainbow edges cycle through `edge_colors`; otherwise every ingredient
    /// is drawn in white.
    pub fn new(config: &FlowConfig) -> Self {
        let cycle = if config.use_rainbow_edges && !config.edge_colors.is_empty() {
            config.edge_colors.clone()
        } else {
            vec![PLAIN.to_string()]
        };
        Self {
            cycle,
            next: 0,
            assigned: HashMap::new(),
        }
    }

    /// Colour of an ingredient id, assigning one on first use.
    pub fn color(&mut self, id: &str) -> String {
        if let Some(color) = self.assigned.get(id) {
            return color.clone();
        }
        let color = self.cycle[self.next % self.cycle.len()].clone();
        self.next += 1;
        self.assigned.insert(id.to_string(), color.clone());
        color
    }

    /// Colour of an ingredient id that has already been assigned one.
    pub fn get(&self, id: &str) -> &str {
        self.assigned.get(id).map(String::as_str).unwrap_or(PLAIN)
    }
}

/// Scale each channel of a `#rrggbb` colour, clamping to `00..ff`.
///
/// Strings that are not six hex digits come back unchanged.
pub fn scale_color(hex: &str, factor: f64) -> String {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return hex.to_string();
    }
    let mut out = String::from("#");
    for i in (0..6).step_by(2) {
        let Ok(channel) = u8::from_str_radix(&digits[i..i + 2], 16) else {
            return hex.to_string();
        };
        let scaled = (channel as f64 * factor).clamp(0.0, 255.0) as u8;
        out.push_str(&format!("{:02x}", scaled));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_cycle_and_stick() {
        let config = FlowConfig {
            edge_colors: vec!["#111111".into(), "#222222".into()],
            ..FlowConfig::default()
        };
        let mut palette = Palette::new(&config);
        assert_eq!(palette.color("water"), "#111111");
        assert_eq!(palette.color("oxygen"), "#222222");
        assert_eq!(palette.color("steam"), "#111111");
        assert_eq!(palette.color("water"), "#111111");
        assert_eq!(palette.get("oxygen"), "#222222");
        assert_eq!(palette.get("unknown"), PLAIN);
    }

    #[test]
    fn test_plain_edges() {
        let config = FlowConfig {
            use_rainbow_edges: false,
            ..FlowConfig::default()
        };
        let mut palette = Palette::new(&config);
        assert_eq!(palette.color("water"), PLAIN);
        assert_eq!(palette.color("oxygen"), PLAIN);
    }

    #[test]
    fn test_scale_color() {
        assert_eq!(scale_color("#808080", 1.5), "#c0c0c0");
        assert_eq!(scale_color("#b58900", 1.5), "#ffcd00");
        assert_eq!(scale_color("white", 1.5), "white");
    }
}
