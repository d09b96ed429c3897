//! Text formatting shared by labels, logs and the DOT writer.

use crate::recipe::Recipe;

/// Magnitude cutoffs for [`round_readable`], largest first.
const CUTOFFS: &[(f64, &str)] = &[
    (1e12, "T"),
    (1e9, "B"),
    (1e6, "M"),
    (1e3, "K"),
];

/// Format a number using orders of magnitude: `512`, `2.31K`, `27.5B`.
///
/// Values are rounded to two decimals and printed in their shortest form
/// (`2.0K`, never `2.00K`). Integral values below 1000 print without a
/// decimal point.
pub fn round_readable(number: f64) -> String {
    for &(cutoff, suffix) in CUTOFFS {
        if number.abs() >= cutoff {
            return format!("{}{}", round2_repr(number / cutoff), suffix);
        }
    }
    if number.fract() == 0.0 {
        format!("{}", number as i64)
    } else {
        round2_repr(number)
    }
}

/// Round to two decimals and drop trailing zeros, keeping one.
fn round2_repr(value: f64) -> String {
    let mut text = format!("{:.2}", value);
    while text.ends_with('0') && !text.ends_with(".0") {
        text.pop();
    }
    if text == "-0.0" {
        text = "0.0".to_string();
    }
    text
}

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Shortest decimal form that still reads as a float: `2.0`, `0.25`.
pub fn decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Capitalize the first letter of every run of letters, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Machine names that already carry capitals are shown as written.
pub fn capitalize_machine(machine: &str) -> String {
    if machine.chars().any(|c| c.is_ascii_uppercase()) {
        machine.to_string()
    } else {
        title_case(machine)
    }
}

/// Ingredient key for colours and summary rows: tags removed, spaces
/// replaced by underscores, lowercase.
pub fn ingredient_id(name: &str) -> String {
    let mut stripped = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(open) = rest.find('[') {
        match rest[open..].find(']') {
            Some(close) => {
                stripped.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    stripped.push_str(rest);
    stripped.trim().replace(' ', "_").to_lowercase()
}

/// Display name of an ingredient.
pub fn ingredient_label(name: &str) -> String {
    if ingredient_id(name) == "eu" {
        "EU".to_string()
    } else {
        title_case(name)
    }
}

/// Edge quantity text: EU in EU/t, everything else per second.
pub fn quantity_label(ingredient_id: &str, quantity: f64) -> String {
    if ingredient_id == "eu" {
        format!("{}/t", (quantity / 20.0).floor() as i64)
    } else {
        format!("{}/s", round_readable(quantity))
    }
}

/// Drop a leading `[tag]` from a name when bracket stripping is enabled.
pub fn strip_brackets(name: &str, enabled: bool) -> String {
    const MARK: &str = "\u{2588} ";
    if !enabled {
        return name.to_string();
    }
    let stripped = name.rsplit(']').next().unwrap_or(name).trim();
    if name.starts_with(MARK) && !stripped.starts_with(MARK) {
        format!("{}{}", MARK, stripped)
    } else {
        stripped.to_string()
    }
}

/// Label lines describing machine-specific attributes, in display order.
pub fn attribute_lines(recipe: &Recipe) -> Vec<String> {
    let mut lines = Vec::new();
    let attr = |key: &str| recipe.attrs.get(key).map(|v| v.to_string());

    if let Some(heat) = attr("heat") {
        lines.push(format!("Base Heat: {}K", heat));
    }
    if let Some(coils) = attr("coils") {
        lines.push(format!("Coils: {}", title_case(&coils)));
    }
    if let Some(saw) = attr("saw_type") {
        lines.push(format!("Saw Type: {}", title_case(&saw)));
    }
    if let Some(material) = attr("material") {
        lines.push(format!("Turbine Material: {}", title_case(&material)));
    }
    if let Some(size) = attr("size") {
        lines.push(format!("Size: {}", title_case(&size)));
    }
    if let Some(efficiency) = attr("efficiency") {
        lines.push(format!("Efficiency: {}", efficiency));
    }
    if let Some(wasted) = attr("wasted_fuel") {
        lines.push(format!("Wasted Fuel: {}", wasted));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_readable() {
        let inputs = [
            0.0004,
            512.0,
            2306.0,
            7777.0,
            2_423_555.0,
            555_555_555.0,
            2_416_777_876.0,
            5_924_333.0,
        ];
        let expected = ["0.0", "512", "2.31K", "7.78K", "2.42M", "555.56M", "2.42B", "5.92M"];
        for (input, want) in inputs.iter().zip(expected) {
            assert_eq!(round_readable(*input), want, "formatting {}", input);
        }
    }

    #[test]
    fn test_round_readable_short_forms() {
        assert_eq!(round_readable(2000.0), "2.0K");
        assert_eq!(round_readable(12.5), "12.5");
        assert_eq!(round_readable(0.0), "0");
        assert_eq!(round_readable(-4.25), "-4.25");
        assert_eq!(decimal(5.0), "5.0");
        assert_eq!(decimal(0.25), "0.25");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("electric blast furnace"), "Electric Blast Furnace");
        assert_eq!(title_case("hss-g"), "Hss-G");
        assert_eq!(title_case("[recycle] water"), "[Recycle] Water");
        assert_eq!(capitalize_machine("MK2 fusion reactor"), "MK2 fusion reactor");
    }

    #[test]
    fn test_ingredient_id_and_labels() {
        assert_eq!(ingredient_id("[recycle] distilled water"), "distilled_water");
        assert_eq!(ingredient_id("Sulfuric Acid"), "sulfuric_acid");
        assert_eq!(ingredient_label("EU"), "EU");
        assert_eq!(quantity_label("eu", 2048.0), "102/t");
        assert_eq!(quantity_label("water", 2306.0), "2.31K/s");
    }

    #[test]
    fn test_strip_brackets() {
        assert_eq!(strip_brackets("[recycle] water", true), "water");
        assert_eq!(strip_brackets("[recycle] water", false), "[recycle] water");
        assert_eq!(strip_brackets("oxygen", true), "oxygen");
    }
}
