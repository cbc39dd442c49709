//! Human-readable rendering of saved responses

use crate::entry::ResponseValue;
use crate::field::Field;

impl Field {
    /// Render a response the way a saved entry summary shows it
    ///
    /// Select fields show option text rather than recorded values. Values that
    /// do not match any option are shown as recorded.
    #[must_use]
    pub fn display_value(&self, value: &ResponseValue) -> String {
        match (self, value) {
            (_, ResponseValue::Blank) => String::new(),
            (Self::Number(spec), ResponseValue::Number(n)) => match &spec.data.units {
                Some(units) => format!("{n} {units}"),
                None => n.to_string(),
            },
            (Self::Question(spec), ResponseValue::Text(recorded)) => spec
                .data
                .options
                .iter()
                .find(|opt| opt.value() == recorded)
                .map_or_else(|| recorded.clone(), |opt| opt.text.clone()),
            (Self::Checklist(spec), ResponseValue::Selection(ids)) => ids
                .iter()
                .map(|id| {
                    spec.data
                        .options
                        .iter()
                        .find(|opt| &opt.id == id)
                        .map_or(id.as_str(), |opt| opt.text.as_str())
                })
                .collect::<Vec<_>>()
                .join(", "),
            (Self::Map(spec), ResponseValue::Features(features)) => {
                let noun = spec
                    .data
                    .map_options
                    .draw_type
                    .map_or("feature", |draw| draw.noun());
                match features.len() {
                    1 => format!("1 {noun}"),
                    n => format!("{n} {noun}s"),
                }
            }
            (_, ResponseValue::Address(address)) => address.joined(", "),
            (_, ResponseValue::Text(s)) => s.clone(),
            (_, ResponseValue::Number(n)) => n.to_string(),
            (_, ResponseValue::Selection(ids)) => ids.join(", "),
            (_, ResponseValue::Features(features)) => features.len().to_string(),
        }
    }
}
