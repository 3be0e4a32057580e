#[cfg(test)]
mod tests {
    use crate::cli::{AddArgs, SearchArgs};
    use crate::resolver::{LookupTool, NameResolver, PlaceDetails, Resolver};
    use crate::search::{SearchEngine, NO_MATCHES};
    use crate::storage::JsonFileStore;
    use crate::testing::{final_answer, next_action, EchoTool, FakePlaces, ScriptedBackend};
    use crate::tools::{add::execute_add, search::execute_search, Services};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn bors_details() -> PlaceDetails {
        PlaceDetails {
            name: Some("Bors GasztroBár".to_string()),
            address: Some("Kazinczy u. 10, Budapest".to_string()),
            rating: Some(4.8),
            cuisines: vec!["Hungarian".to_string(), "Street Food".to_string()],
            category: Some("Restaurant".to_string()),
            weekday_text: vec![
                "Monday: 11:30 - 21:00".to_string(),
                "Tuesday: 11:30 - 21:00".to_string(),
            ],
            ..Default::default()
        }
    }

    fn services(dir: &TempDir) -> Services {
        let backend = Arc::new(ScriptedBackend::new(vec![
            next_action("Search", "borsh gastro bar budapest"),
            final_answer("Bors GasztroBár"),
        ]));
        let search: Arc<dyn LookupTool> = Arc::new(EchoTool::new("Search"));
        let names = NameResolver::new(backend, vec![search], 3);
        let places = FakePlaces::new().with_place("Bors GasztroBár", "987", bors_details());
        let resolver = Resolver::new(names, Arc::new(places), "restaurants", "budapest");
        let store = Arc::new(JsonFileStore::new(dir.path().join("stores.json")));

        Services::new(Some(resolver), store, SearchEngine::new())
    }

    #[tokio::test]
    async fn added_place_is_found_by_typo_and_cuisine() {
        let dir = TempDir::new().unwrap();
        let services = services(&dir);

        execute_add(AddArgs { name: "borsh gastro bar".into() }, &services)
            .await
            .expect("add succeeds");

        for term in ["bors", "BORS GASZTROBÁR", "street food", "hungarian"] {
            let result = execute_search(SearchArgs { term: term.into() }, &services)
                .await
                .unwrap();
            let text = &result;
            assert!(
                text.starts_with("1. 🍔 Bors Gasztrobár:"),
                "'{}' should find the place, got {}",
                term,
                text
            );
            assert!(text.contains("📅 Hours:\nMonday: 11:30 - 21:00"));
        }

        let result = execute_search(SearchArgs { term: "sushi".into() }, &services)
            .await
            .unwrap();
        assert_eq!(result, NO_MATCHES);
    }

    #[tokio::test]
    async fn stored_file_holds_one_normalized_row() {
        let dir = TempDir::new().unwrap();
        let services = services(&dir);

        execute_add(AddArgs { name: "borsh gastro bar".into() }, &services)
            .await
            .unwrap();

        let text = std::fs::read_to_string(dir.path().join("stores.json")).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "bors gasztrobár");
        assert_eq!(rows[0]["phone"], "unknown");
        assert_eq!(rows[0]["opening_hours"]["monday"], "11:30 - 21:00");
    }

    #[test]
    fn tool_schemas_require_their_single_argument() {
        let tools = crate::mcp::tool_catalog();
        let tools_arr = tools.as_array().expect("tools array");
        for (tool, field) in [("add_establishment", "name"), ("search_establishments", "term")] {
            let entry = tools_arr
                .iter()
                .find(|t| t.get("name").and_then(|n| n.as_str()) == Some(tool))
                .expect("tool present");
            let schema = entry.get("inputSchema").expect("schema");
            assert!(schema["properties"].get(field).is_some());
            assert_eq!(schema["required"][0], field);
        }
    }
}
