//! Test data builders for JSON map files

use serde_json::{json, Map, Value};
use std::path::PathBuf;

/// Builder for JSON map files written to a temp directory
pub struct MapFileBuilder {
    title: Option<String>,
    groups: Vec<Value>,
    frame_parser: Option<String>,
}

impl MapFileBuilder {
    pub fn new() -> Self {
        Self {
            title: None,
            groups: Vec::new(),
            frame_parser: None,
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Add a group of `(index, title)` datasets
    pub fn group(mut self, title: &str, datasets: &[(i64, &str)]) -> Self {
        let datasets: Vec<Value> = datasets
            .iter()
            .map(|(index, title)| json!({ "index": index, "title": title }))
            .collect();
        self.groups
            .push(json!({ "title": title, "datasets": datasets }));
        self
    }

    pub fn frame_parser(mut self, code: &str) -> Self {
        self.frame_parser = Some(code.to_string());
        self
    }

    pub fn to_json(&self) -> String {
        let mut root = Map::new();
        if let Some(title) = &self.title {
            root.insert("title".into(), json!(title));
        }
        if let Some(code) = &self.frame_parser {
            root.insert("frameParser".into(), json!(code));
        }
        root.insert("groups".into(), Value::Array(self.groups.clone()));
        Value::Object(root).to_string()
    }

    /// Write the map to `dir/name`
    pub fn write(&self, dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, self.to_json()).unwrap();
        path
    }
}

/// The two-sensor weather map used across tests
pub fn weather_map() -> MapFileBuilder {
    MapFileBuilder::new()
        .title("Weather")
        .group("Sensors", &[(1, "Temp"), (2, "Humidity")])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_file_builder() {
        let json: Value = serde_json::from_str(&weather_map().frame_parser("x").to_json()).unwrap();
        assert_eq!(json["title"], "Weather");
        assert_eq!(json["frameParser"], "x");
        assert_eq!(json["groups"][0]["datasets"][1]["index"], 2);
    }
}
