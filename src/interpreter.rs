//! Content-stream interpreter (4.E): walks `(operands, operator)` pairs,
//! tracking current font, position, marked-content id, emitting text
//! events consumed by both the structured walker (F) and the geometric
//! reconstructor (G).

use crate::content::Operand;
use crate::font_cache::{find_cmap, FontSet};
use crate::object_graph::ContentOp;
use crate::text_decoder::decode_bytes;

/// A rectangle in PDF user space (y grows upward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }
}

/// Whether font-encoded byte strings are decoded through the active CMap
/// (`Hex`), or text-string operands bypass the CMap and are appended
/// verbatim while byte-strings still decode (`Literal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Hex,
    Literal,
}

/// A unit of emitted text, carrying the interpreter's state at emission
/// time.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEvent {
    pub text: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rect: Option<Rectangle>,
    pub mcid: Option<i64>,
}

/// Walks a content stream, maintaining interpreter state and emitting
/// [`TextEvent`]s for every text-showing operator.
pub struct Interpreter<'a> {
    mode: Mode,
    font_set: &'a FontSet,
    current_font: Option<String>,
    last_x: Option<f64>,
    last_y: Option<f64>,
    current_rect: Option<Rectangle>,
    current_mcid: Option<i64>,
}

impl<'a> Interpreter<'a> {
    pub fn new(mode: Mode, font_set: &'a FontSet) -> Self {
        Interpreter {
            mode,
            font_set,
            current_font: None,
            last_x: None,
            last_y: None,
            current_rect: None,
            current_mcid: None,
        }
    }

    /// Run the interpreter over a lazily-produced sequence of operations,
    /// consumed once in order.
    pub fn run(&mut self, ops: impl IntoIterator<Item = ContentOp>) -> Vec<TextEvent> {
        let mut events = Vec::new();
        for op in ops {
            self.update_mcid(&op.operands);
            self.dispatch(&op, &mut events);
        }
        events
    }

    fn dispatch(&mut self, op: &ContentOp, events: &mut Vec<TextEvent>) {
        match op.operator.as_str() {
            "Tf" => {
                if let Some(name) = op.operands.first().and_then(operand_name) {
                    self.current_font = Some(name);
                }
            }
            "Tj" => {
                if let Some(operand) = op.operands.first() {
                    self.emit_decoded(operand, events);
                }
            }
            "TJ" => {
                if let Some(Operand::Array(items)) = op.operands.first() {
                    let mut text = String::new();
                    for item in items {
                        if let Some(t) = self.decode(item) {
                            text.push_str(&t);
                        }
                    }
                    self.push_event(text, events);
                }
            }
            "T*" => self.push_event("\n".to_string(), events),
            "'" => {
                self.push_event("\n".to_string(), events);
                if let Some(operand) = op.operands.first() {
                    let text = self.decode_forced(operand, Mode::Literal);
                    self.push_event(text, events);
                }
            }
            "\"" => {
                self.push_event("\n".to_string(), events);
                if let Some(operand) = op.operands.get(2) {
                    let text = self.decode_forced(operand, Mode::Literal);
                    self.push_event(text, events);
                }
            }
            "Td" => {
                if let (Some(x), Some(y)) = (
                    op.operands.first().and_then(Operand::as_f64),
                    op.operands.get(1).and_then(Operand::as_f64),
                ) {
                    self.last_x = Some(x);
                    self.last_y = Some(y);
                }
            }
            "cm" => {
                let numbers: Vec<f64> = op.operands.iter().filter_map(Operand::as_f64).collect();
                if numbers.len() >= 2 {
                    self.last_x = Some(numbers[numbers.len() - 2]);
                    self.last_y = Some(numbers[numbers.len() - 1]);
                }
            }
            "re" => {
                let numbers: Vec<f64> = op.operands.iter().filter_map(Operand::as_f64).collect();
                if numbers.len() == 4 {
                    self.current_rect = Some(Rectangle {
                        x: numbers[0],
                        y: numbers[1],
                        width: numbers[2],
                        height: numbers[3],
                    });
                }
            }
            _ => {}
        }
    }

    fn emit_decoded(&mut self, operand: &Operand, events: &mut Vec<TextEvent>) {
        if let Some(text) = self.decode(operand) {
            self.push_event(text, events);
        }
    }

    fn decode(&self, operand: &Operand) -> Option<String> {
        match operand {
            Operand::Number(_) => None,
            other => Some(self.decode_forced(other, self.mode)),
        }
    }

    fn decode_forced(&self, operand: &Operand, mode: Mode) -> String {
        if mode == Mode::Literal {
            if let Operand::Text(s) = operand {
                return s.clone();
            }
        }
        match operand.raw_bytes() {
            Some(bytes) => {
                let cmap = self
                    .current_font
                    .as_deref()
                    .and_then(|name| find_cmap(self.font_set, name));
                match cmap {
                    Some(cmap) => decode_bytes(bytes, cmap),
                    None => String::new(),
                }
            }
            None => String::new(),
        }
    }

    fn push_event(&self, text: String, events: &mut Vec<TextEvent>) {
        events.push(TextEvent {
            text,
            x: self.last_x,
            y: self.last_y,
            rect: self.current_rect,
            mcid: self.current_mcid,
        });
    }

    fn update_mcid(&mut self, operands: &[Operand]) {
        for operand in operands {
            if let Some(dict) = operand.as_dict() {
                if let Some(mcid) = dict.get("MCID").and_then(Operand::as_f64) {
                    self.current_mcid = Some(mcid as i64);
                    return;
                }
            }
        }
    }
}

fn operand_name(operand: &Operand) -> Option<String> {
    match operand {
        Operand::Text(s) => Some(s.clone()),
        Operand::Bytes(b) => String::from_utf8(b.clone()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn op(operator: &str, operands: Vec<Operand>) -> ContentOp {
        ContentOp {
            operands,
            operator: operator.to_string(),
        }
    }

    fn font_set_with(name: &str, pairs: &[(&str, &str)]) -> FontSet {
        let mut cmap = crate::cmap::CMap::new();
        for (k, v) in pairs {
            cmap.insert(*k, *v);
        }
        vec![(name.to_string(), cmap)]
    }

    #[test]
    fn tf_tj_decodes_through_active_cmap() {
        let font_set = font_set_with("F1", &[("0041", "A")]);
        let mut interp = Interpreter::new(Mode::Hex, &font_set);
        let events = interp.run(vec![
            op("Tf", vec![Operand::Text("F1".into()), Operand::Number(12.0)]),
            op("Tj", vec![Operand::Bytes(vec![0x00, 0x41])]),
        ]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "A");
    }

    #[test]
    fn tj_array_ignores_numeric_kerns() {
        let font_set = font_set_with("F1", &[("0041", "A"), ("0042", "B")]);
        let mut interp = Interpreter::new(Mode::Hex, &font_set);
        let events = interp.run(vec![
            op("Tf", vec![Operand::Text("F1".into())]),
            op(
                "TJ",
                vec![Operand::Array(vec![
                    Operand::Bytes(vec![0x00, 0x41]),
                    Operand::Number(-250.0),
                    Operand::Bytes(vec![0x00, 0x42]),
                ])],
            ),
        ]);
        assert_eq!(events[0].text, "AB");
    }

    #[test]
    fn t_star_emits_newline() {
        let font_set = FontSet::new();
        let mut interp = Interpreter::new(Mode::Hex, &font_set);
        let events = interp.run(vec![op("T*", vec![])]);
        assert_eq!(events[0].text, "\n");
    }

    #[test]
    fn re_sets_current_rect_on_events() {
        let font_set = font_set_with("F1", &[("0041", "A")]);
        let mut interp = Interpreter::new(Mode::Hex, &font_set);
        let events = interp.run(vec![
            op("re", vec![
                Operand::Number(1.0),
                Operand::Number(2.0),
                Operand::Number(3.0),
                Operand::Number(4.0),
            ]),
            op("Tf", vec![Operand::Text("F1".into())]),
            op("Tj", vec![Operand::Bytes(vec![0x00, 0x41])]),
        ]);
        let rect = events[0].rect.unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn mcid_dict_is_picked_up_and_sticks() {
        let font_set = font_set_with("F1", &[("0041", "A")]);
        let mut interp = Interpreter::new(Mode::Hex, &font_set);
        let mut props = HashMap::new();
        props.insert("MCID".to_string(), Operand::Number(3.0));
        let events = interp.run(vec![
            op("Tf", vec![Operand::Text("F1".into())]),
            op("BDC", vec![Operand::Text("P".into()), Operand::Dict(props)]),
            op("Tj", vec![Operand::Bytes(vec![0x00, 0x41])]),
            op("Tj", vec![Operand::Bytes(vec![0x00, 0x41])]),
        ]);
        assert_eq!(events[0].mcid, Some(3));
        assert_eq!(events[1].mcid, Some(3));
    }

    #[test]
    fn literal_mode_passes_text_strings_through_unchanged() {
        let font_set = FontSet::new();
        let mut interp = Interpreter::new(Mode::Literal, &font_set);
        let events = interp.run(vec![op("Tj", vec![Operand::Text("already decoded".into())])]);
        assert_eq!(events[0].text, "already decoded");
    }
}
