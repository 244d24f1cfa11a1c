/// A loosely parsed `"a, b -> c, d"` signature. Only used to decorate
/// prompts and step text; nothing is validated against it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl Signature {
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split("->");
        let inputs = parts.next().map(fields).unwrap_or_default();
        let outputs = parts.next().map(fields).unwrap_or_default();
        Self { inputs, outputs }
    }

    pub fn inputs_label(&self) -> String {
        label(&self.inputs)
    }

    pub fn outputs_label(&self) -> String {
        label(&self.outputs)
    }
}

fn fields(part: &str) -> Vec<String> {
    part.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

fn label(fields: &[String]) -> String {
    if fields.is_empty() {
        "none".to_string()
    } else {
        fields.join(", ")
    }
}
