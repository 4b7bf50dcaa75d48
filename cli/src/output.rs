//! Output formatting

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn print<T: Serialize>(&self, data: &T) {
        println!("{}", self.render(data));
    }

    pub fn render<T: Serialize>(&self, data: &T) -> String {
        match self {
            OutputFormat::Json => serde_json::to_string_pretty(data).unwrap_or_default(),
            OutputFormat::Yaml => serde_yaml::to_string(data).unwrap_or_default(),
            OutputFormat::Table => match serde_json::to_value(data) {
                Ok(Value::Object(fields)) => {
                    let mut builder = Builder::default();
                    builder.push_record(["FIELD", "VALUE"]);
                    for (name, value) in fields {
                        builder.push_record([name, cell(&value)]);
                    }
                    let mut table = builder.build();
                    table.with(Style::rounded());
                    table.to_string()
                }
                Ok(other) => cell(&other),
                Err(_) => String::new(),
            },
        }
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".into(),
        other => other.to_string(),
    }
}
