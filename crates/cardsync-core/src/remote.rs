use crate::config::Credentials;
use crate::error::{Result, SyncError};
use serde::Deserialize;
use serde_json::json;

// ---------------------------------------------------------------------------
// Remote entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "idList", default)]
    pub list_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Checklist {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckItem {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// BoardClient
// ---------------------------------------------------------------------------

/// Card/checklist CRUD against the remote board. The reconciler and inbound
/// sync depend only on this contract.
pub trait BoardClient {
    fn list_cards(&self, list_id: &str) -> Result<Vec<Card>>;
    fn get_card(&self, card_id: &str) -> Result<Card>;
    fn create_card(
        &self,
        list_id: &str,
        name: &str,
        desc: &str,
        label_ids: &[String],
    ) -> Result<Card>;
    fn create_checklist(&self, card_id: &str, name: &str) -> Result<Checklist>;
    fn list_checklists(&self, card_id: &str) -> Result<Vec<Checklist>>;
    /// Items in remote display order.
    fn get_checklist_items(&self, checklist_id: &str) -> Result<Vec<CheckItem>>;
    fn add_check_item(&self, checklist_id: &str, name: &str) -> Result<CheckItem>;
    fn delete_card(&self, card_id: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// TrelloClient
// ---------------------------------------------------------------------------

/// Blocking HTTP implementation against the Trello REST API (or anything
/// wire-compatible). Auth rides as `key`/`token` query parameters on every
/// call; payloads go as JSON bodies.
pub struct TrelloClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    api_token: String,
}

impl TrelloClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_token: api_token.into(),
        }
    }

    pub fn from_credentials(base_url: &str, creds: &Credentials) -> Self {
        Self::new(base_url, &creds.api_key, &creds.api_token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth(&self) -> [(&'static str, &str); 2] {
        [("key", self.api_key.as_str()), ("token", self.api_token.as_str())]
    }

    fn get(&self, path: &str) -> Result<reqwest::blocking::Response> {
        let resp = self.http.get(self.url(path)).query(&self.auth()).send()?;
        check_status(resp)
    }

    fn post(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::blocking::Response> {
        let resp = self
            .http
            .post(self.url(path))
            .query(&self.auth())
            .json(body)
            .send()?;
        check_status(resp)
    }
}

fn check_status(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let mut message = resp.text().unwrap_or_default();
    message.truncate(200);
    Err(SyncError::Api {
        status: status.as_u16(),
        message,
    })
}

impl BoardClient for TrelloClient {
    fn list_cards(&self, list_id: &str) -> Result<Vec<Card>> {
        Ok(self.get(&format!("/lists/{list_id}/cards"))?.json()?)
    }

    fn get_card(&self, card_id: &str) -> Result<Card> {
        Ok(self.get(&format!("/cards/{card_id}"))?.json()?)
    }

    fn create_card(
        &self,
        list_id: &str,
        name: &str,
        desc: &str,
        label_ids: &[String],
    ) -> Result<Card> {
        let body = json!({
            "name": name,
            "desc": desc,
            "pos": "bottom",
            "idList": list_id,
            "idLabels": label_ids,
        });
        Ok(self.post("/cards", &body)?.json()?)
    }

    fn create_checklist(&self, card_id: &str, name: &str) -> Result<Checklist> {
        let body = json!({
            "name": name,
            "idCard": card_id,
            "pos": "bottom",
        });
        Ok(self.post("/checklists", &body)?.json()?)
    }

    fn list_checklists(&self, card_id: &str) -> Result<Vec<Checklist>> {
        Ok(self.get(&format!("/cards/{card_id}/checklists"))?.json()?)
    }

    fn get_checklist_items(&self, checklist_id: &str) -> Result<Vec<CheckItem>> {
        Ok(self
            .get(&format!("/checklists/{checklist_id}/checkItems"))?
            .json()?)
    }

    fn add_check_item(&self, checklist_id: &str, name: &str) -> Result<CheckItem> {
        let body = json!({ "name": name, "pos": "bottom" });
        Ok(self
            .post(&format!("/checklists/{checklist_id}/checkItems"), &body)?
            .json()?)
    }

    fn delete_card(&self, card_id: &str) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/cards/{card_id}")))
            .query(&self.auth())
            .send()?;
        check_status(resp)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> TrelloClient {
        TrelloClient::new(server.url(), "test-key", "test-token")
    }

    fn auth_matcher() -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), "test-key".into()),
            Matcher::UrlEncoded("token".into(), "test-token".into()),
        ])
    }

    #[test]
    fn list_cards_sends_auth_and_parses() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/lists/l1/cards")
            .match_query(auth_matcher())
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"c1","name":"Task A","idList":"l1"}]"#)
            .create();

        let cards = client(&server).list_cards("l1").unwrap();
        mock.assert();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, "c1");
        assert_eq!(cards[0].name, "Task A");
        assert_eq!(cards[0].list_id, "l1");
    }

    #[test]
    fn get_card_returns_list_membership() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/cards/c9")
            .match_query(auth_matcher())
            .with_body(r#"{"id":"c9","name":"Moved","idList":"other-list"}"#)
            .create();

        let card = client(&server).get_card("c9").unwrap();
        assert_eq!(card.list_id, "other-list");
    }

    #[test]
    fn create_card_posts_json_payload() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/cards")
            .match_query(auth_matcher())
            .match_body(Matcher::PartialJson(serde_json::json!({
                "name": "Validate order total",
                "idList": "l1",
                "idLabels": ["red-1"],
            })))
            .with_body(r#"{"id":"new-card"}"#)
            .create();

        let card = client(&server)
            .create_card("l1", "Validate order total", "desc", &["red-1".to_string()])
            .unwrap();
        mock.assert();
        assert_eq!(card.id, "new-card");
    }

    #[test]
    fn create_checklist_targets_card() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/checklists")
            .match_query(auth_matcher())
            .match_body(Matcher::PartialJson(
                serde_json::json!({"idCard": "c1", "name": "Checklist"}),
            ))
            .with_body(r#"{"id":"cl-1"}"#)
            .create();

        let cl = client(&server).create_checklist("c1", "Checklist").unwrap();
        assert_eq!(cl.id, "cl-1");
    }

    #[test]
    fn checklist_items_preserve_remote_order() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/checklists/cl-1/checkItems")
            .match_query(auth_matcher())
            .with_body(r#"[{"id":"i2","name":"second"},{"id":"i1","name":"first"}]"#)
            .create();

        let items = client(&server).get_checklist_items("cl-1").unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["second", "first"]);
    }

    #[test]
    fn add_check_item_posts_name() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/checklists/cl-1/checkItems")
            .match_query(auth_matcher())
            .match_body(Matcher::PartialJson(serde_json::json!({"name": "Check A"})))
            .with_body(r#"{"id":"i1","name":"Check A"}"#)
            .create();

        let item = client(&server).add_check_item("cl-1", "Check A").unwrap();
        assert_eq!(item.id, "i1");
    }

    #[test]
    fn delete_card_issues_delete() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("DELETE", "/cards/c1")
            .match_query(auth_matcher())
            .with_body("{}")
            .create();

        client(&server).delete_card("c1").unwrap();
        mock.assert();
    }

    #[test]
    fn non_success_status_becomes_api_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/cards/gone")
            .match_query(auth_matcher())
            .with_status(404)
            .with_body("card not found")
            .create();

        let err = client(&server).get_card("gone").unwrap_err();
        match err {
            SyncError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("card not found"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn auth_failure_is_api_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/lists/l1/cards")
            .match_query(auth_matcher())
            .with_status(401)
            .with_body("invalid key")
            .create();

        assert!(matches!(
            client(&server).list_cards("l1"),
            Err(SyncError::Api { status: 401, .. })
        ));
    }
}
