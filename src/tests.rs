//! Integration tests for the Tally backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        // Create config
        let config = Config {
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_group(&self, name: &str) -> Value {
        let resp = self
            .client
            .post(self.url("/api/groups"))
            .json(&json!({ "group_name": name }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true);
        body["data"].clone()
    }

    async fn create_player(&self, group_id: &str, name: &str) -> Value {
        let resp = self
            .client
            .post(self.url("/api/players"))
            .json(&json!({ "player_name": name, "group_id": group_id }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }

    async fn create_team(&self, group_id: &str, name: &str, player_ids: &[&str]) -> Value {
        let resp = self
            .client
            .post(self.url("/api/teams"))
            .json(&json!({
                "team_name": name,
                "group_id": group_id,
                "player_ids": player_ids
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }

    async fn record_session(&self, session: Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/game-sessions"))
            .json(&session)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }

    async fn get_json(&self, path: &str) -> Value {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true);
        body["data"].clone()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_group_create_join_rename() {
    let fixture = TestFixture::new().await;

    let group = fixture.create_group("Friday Night Games").await;
    let group_id = group["id"].as_str().unwrap();
    let group_code = group["group_code"].as_str().unwrap();

    assert_eq!(group_code.len(), 6);
    assert!(group_code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

    // Join by code
    let join_resp = fixture
        .client
        .post(fixture.url("/api/groups/join"))
        .json(&json!({ "group_code": group_code }))
        .send()
        .await
        .unwrap();
    assert_eq!(join_resp.status(), 200);
    let join_body: Value = join_resp.json().await.unwrap();
    assert_eq!(join_body["data"]["id"], group_id);

    // Join with unknown code
    let bad_join = fixture
        .client
        .post(fixture.url("/api/groups/join"))
        .json(&json!({ "group_code": "ZZZZZZ" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_join.status(), 404);
    let bad_body: Value = bad_join.json().await.unwrap();
    assert_eq!(bad_body["success"], false);
    assert_eq!(bad_body["error"]["code"], "NOT_FOUND");

    // Rename
    let rename_resp = fixture
        .client
        .put(fixture.url(&format!("/api/groups/{}", group_id)))
        .json(&json!({ "group_name": "Saturday Night Games" }))
        .send()
        .await
        .unwrap();
    assert_eq!(rename_resp.status(), 200);

    let fetched = fixture
        .get_json(&format!("/api/groups/{}", group_id))
        .await;
    assert_eq!(fetched["group_name"], "Saturday Night Games");
    // Code survives the rename
    assert_eq!(fetched["group_code"], group_code);
}

#[tokio::test]
async fn test_player_creation_and_conflicts() {
    let fixture = TestFixture::new().await;

    let group = fixture.create_group("Crew").await;
    let group_id = group["id"].as_str().unwrap();

    let player = fixture.create_player(group_id, "Alice").await;
    assert_eq!(player["total_score"], 0);
    assert_eq!(player["games_played"], 0);
    assert_eq!(player["emoji"], "😀");

    // Duplicate name in the same group
    let dup_resp = fixture
        .client
        .post(fixture.url("/api/players"))
        .json(&json!({ "player_name": "Alice", "group_id": group_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(dup_resp.status(), 409);
    let dup_body: Value = dup_resp.json().await.unwrap();
    assert_eq!(dup_body["error"]["code"], "CONFLICT");

    // Unknown group
    let orphan_resp = fixture
        .client
        .post(fixture.url("/api/players"))
        .json(&json!({ "player_name": "Bob", "group_id": "no-such-group" }))
        .send()
        .await
        .unwrap();
    assert_eq!(orphan_resp.status(), 404);

    // Empty name
    let empty_resp = fixture
        .client
        .post(fixture.url("/api/players"))
        .json(&json!({ "player_name": "  ", "group_id": group_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty_resp.status(), 400);

    // Same name is fine in a different group
    let other_group = fixture.create_group("Other Crew").await;
    let other_alice = fixture
        .create_player(other_group["id"].as_str().unwrap(), "Alice")
        .await;
    assert_eq!(other_alice["player_name"], "Alice");
}

#[tokio::test]
async fn test_team_creation_validates_members() {
    let fixture = TestFixture::new().await;

    let group = fixture.create_group("Crew").await;
    let group_id = group["id"].as_str().unwrap();
    let alice = fixture.create_player(group_id, "Alice").await;
    let alice_id = alice["id"].as_str().unwrap();

    // Unknown member id
    let bad_resp = fixture
        .client
        .post(fixture.url("/api/teams"))
        .json(&json!({
            "team_name": "Reds",
            "group_id": group_id,
            "player_ids": [alice_id, "ghost"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_resp.status(), 404);

    let team = fixture.create_team(group_id, "Reds", &[alice_id]).await;
    assert_eq!(team["player_ids"][0], alice_id);

    // Duplicate team name
    let dup_resp = fixture
        .client
        .post(fixture.url("/api/teams"))
        .json(&json!({
            "team_name": "Reds",
            "group_id": group_id,
            "player_ids": []
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(dup_resp.status(), 409);
}

#[tokio::test]
async fn test_session_updates_ledger_with_team_distribution() {
    let fixture = TestFixture::new().await;

    let group = fixture.create_group("Crew").await;
    let group_id = group["id"].as_str().unwrap();
    let alice = fixture.create_player(group_id, "Alice").await;
    let bob = fixture.create_player(group_id, "Bob").await;
    let alice_id = alice["id"].as_str().unwrap();
    let bob_id = bob["id"].as_str().unwrap();
    let team = fixture.create_team(group_id, "Reds", &[alice_id, bob_id]).await;
    let team_id = team["id"].as_str().unwrap();

    fixture
        .record_session(json!({
            "group_id": group_id,
            "game_name": "Codenames",
            "game_date": "2025-06-01T19:00:00Z",
            "player_scores": [
                { "player_id": alice_id, "player_name": "Alice", "score": 10 }
            ],
            "team_scores": [
                { "team_id": team_id, "team_name": "Reds", "score": 7,
                  "player_ids": [alice_id, bob_id] }
            ]
        }))
        .await;

    let players = fixture
        .get_json(&format!("/api/groups/{}/players", group_id))
        .await;
    let find = |name: &str| -> Value {
        players
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["player_name"] == name)
            .cloned()
            .unwrap()
    };

    // Alice: 10 individual + floor(7/2) = 13, two game credits
    let alice_after = find("Alice");
    assert_eq!(alice_after["total_score"], 13);
    assert_eq!(alice_after["games_played"], 2);

    // Bob: floor(7/2) = 3, one game credit; the remainder point is dropped
    let bob_after = find("Bob");
    assert_eq!(bob_after["total_score"], 3);
    assert_eq!(bob_after["games_played"], 1);

    let teams = fixture
        .get_json(&format!("/api/groups/{}/teams", group_id))
        .await;
    assert_eq!(teams[0]["total_score"], 7);
    assert_eq!(teams[0]["games_played"], 1);
}

#[tokio::test]
async fn test_session_delete_restores_ledger_exactly() {
    let fixture = TestFixture::new().await;

    let group = fixture.create_group("Crew").await;
    let group_id = group["id"].as_str().unwrap();
    let alice = fixture.create_player(group_id, "Alice").await;
    let bob = fixture.create_player(group_id, "Bob").await;
    let carol = fixture.create_player(group_id, "Carol").await;
    let alice_id = alice["id"].as_str().unwrap();
    let bob_id = bob["id"].as_str().unwrap();
    let carol_id = carol["id"].as_str().unwrap();
    let team = fixture
        .create_team(group_id, "Trio", &[alice_id, bob_id, carol_id])
        .await;
    let team_id = team["id"].as_str().unwrap();

    // Seed an earlier session so pre-deletion totals are non-zero
    fixture
        .record_session(json!({
            "group_id": group_id,
            "game_name": "Catan",
            "game_date": "2025-05-01T19:00:00Z",
            "player_scores": [
                { "player_id": alice_id, "player_name": "Alice", "score": 8 },
                { "player_id": bob_id, "player_name": "Bob", "score": 5 }
            ],
            "team_scores": []
        }))
        .await;

    let snapshot = fixture
        .get_json(&format!("/api/groups/{}/players", group_id))
        .await;

    // Score 11 across 3 members floors to 3 each; 2 points are dropped
    let session = fixture
        .record_session(json!({
            "group_id": group_id,
            "game_name": "Codenames",
            "game_date": "2025-06-01T19:00:00Z",
            "player_scores": [
                { "player_id": alice_id, "player_name": "Alice", "score": -4 }
            ],
            "team_scores": [
                { "team_id": team_id, "team_name": "Trio", "score": 11,
                  "player_ids": [alice_id, bob_id, carol_id] }
            ]
        }))
        .await;
    let session_id = session["id"].as_str().unwrap();

    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/game-sessions/{}", session_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    // Every (total_score, games_played) pair returns to its pre-creation value
    let restored = fixture
        .get_json(&format!("/api/groups/{}/players", group_id))
        .await;
    assert_eq!(restored, snapshot);

    let teams = fixture
        .get_json(&format!("/api/groups/{}/teams", group_id))
        .await;
    assert_eq!(teams[0]["total_score"], 0);
    assert_eq!(teams[0]["games_played"], 0);

    // Deleting again is NotFound, not a silent no-op
    let second_delete = fixture
        .client
        .delete(fixture.url(&format!("/api/game-sessions/{}", session_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(second_delete.status(), 404);
}

#[tokio::test]
async fn test_session_deletion_tolerates_removed_player() {
    let fixture = TestFixture::new().await;

    let group = fixture.create_group("Crew").await;
    let group_id = group["id"].as_str().unwrap();
    let alice = fixture.create_player(group_id, "Alice").await;
    let bob = fixture.create_player(group_id, "Bob").await;
    let alice_id = alice["id"].as_str().unwrap();
    let bob_id = bob["id"].as_str().unwrap();

    let session = fixture
        .record_session(json!({
            "group_id": group_id,
            "game_name": "Catan",
            "game_date": "2025-05-01T19:00:00Z",
            "player_scores": [
                { "player_id": alice_id, "player_name": "Alice", "score": 8 },
                { "player_id": bob_id, "player_name": "Bob", "score": 5 }
            ],
            "team_scores": []
        }))
        .await;
    let session_id = session["id"].as_str().unwrap();

    // Remove Alice out of band; her ledger entry vanishes with her
    let delete_player = fixture
        .client
        .delete(fixture.url(&format!("/api/players/{}", alice_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_player.status(), 200);

    // Session deletion still succeeds; the dangling delta is swallowed
    let delete_session = fixture
        .client
        .delete(fixture.url(&format!("/api/game-sessions/{}", session_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_session.status(), 200);

    let players = fixture
        .get_json(&format!("/api/groups/{}/players", group_id))
        .await;
    let bob_after = players
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["player_name"] == "Bob")
        .unwrap();
    assert_eq!(bob_after["total_score"], 0);
    assert_eq!(bob_after["games_played"], 0);
}

#[tokio::test]
async fn test_player_deletion_cascades_into_rosters_and_sessions() {
    let fixture = TestFixture::new().await;

    let group = fixture.create_group("Crew").await;
    let group_id = group["id"].as_str().unwrap();
    let alice = fixture.create_player(group_id, "Alice").await;
    let bob = fixture.create_player(group_id, "Bob").await;
    let alice_id = alice["id"].as_str().unwrap();
    let bob_id = bob["id"].as_str().unwrap();
    fixture.create_team(group_id, "Reds", &[alice_id, bob_id]).await;

    fixture
        .record_session(json!({
            "group_id": group_id,
            "game_name": "Catan",
            "game_date": "2025-05-01T19:00:00Z",
            "player_scores": [
                { "player_id": alice_id, "player_name": "Alice", "score": 8 },
                { "player_id": bob_id, "player_name": "Bob", "score": 5 }
            ],
            "team_scores": []
        }))
        .await;

    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/players/{}", alice_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    let teams = fixture
        .get_json(&format!("/api/groups/{}/teams", group_id))
        .await;
    let roster = teams[0]["player_ids"].as_array().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0], bob_id);

    let sessions = fixture
        .get_json(&format!("/api/groups/{}/game-sessions", group_id))
        .await;
    let scores = sessions[0]["player_scores"].as_array().unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0]["player_id"], bob_id);

    // Bob's historical ledger contribution is intentionally untouched
    let players = fixture
        .get_json(&format!("/api/groups/{}/players", group_id))
        .await;
    assert_eq!(players[0]["total_score"], 5);
}

#[tokio::test]
async fn test_normalized_leaderboard_mixed_scales() {
    let fixture = TestFixture::new().await;

    let group = fixture.create_group("Crew").await;
    let group_id = group["id"].as_str().unwrap();
    let x = fixture.create_player(group_id, "X").await;
    let y = fixture.create_player(group_id, "Y").await;
    let x_id = x["id"].as_str().unwrap();
    let y_id = y["id"].as_str().unwrap();

    fixture
        .record_session(json!({
            "group_id": group_id,
            "game_name": "Game A",
            "game_date": "2025-02-01T19:00:00Z",
            "player_scores": [
                { "player_id": x_id, "player_name": "X", "score": 3 },
                { "player_id": y_id, "player_name": "Y", "score": 10 }
            ],
            "team_scores": []
        }))
        .await;
    fixture
        .record_session(json!({
            "group_id": group_id,
            "game_name": "Game B",
            "game_date": "2025-02-02T19:00:00Z",
            "player_scores": [
                { "player_id": x_id, "player_name": "X", "score": 300 },
                { "player_id": y_id, "player_name": "Y", "score": 1000 }
            ],
            "team_scores": []
        }))
        .await;

    let board = fixture
        .get_json(&format!(
            "/api/groups/{}/leaderboard/players/normalized",
            group_id
        ))
        .await;

    // Y swept both buckets: exactly 2.0 against X's 0.0
    assert_eq!(board[0]["id"], y_id);
    assert_eq!(board[0]["normalized_score"], 2.0);
    assert_eq!(board[1]["id"], x_id);
    assert_eq!(board[1]["normalized_score"], 0.0);

    // The raw board tells the opposite-scale story: sums dominated by Game B
    let raw_board = fixture
        .get_json(&format!("/api/groups/{}/leaderboard/players", group_id))
        .await;
    assert_eq!(raw_board[0]["total_score"], 1010);
    assert!(raw_board[0].get("normalized_score").is_none());
}

#[tokio::test]
async fn test_filtered_leaderboard_uses_normalized_path() {
    let fixture = TestFixture::new().await;

    let group = fixture.create_group("Crew").await;
    let group_id = group["id"].as_str().unwrap();
    let alice = fixture.create_player(group_id, "Alice").await;
    let alice_id = alice["id"].as_str().unwrap();

    fixture
        .record_session(json!({
            "group_id": group_id,
            "game_name": "Catan",
            "game_date": "2025-03-10T19:00:00Z",
            "player_scores": [
                { "player_id": alice_id, "player_name": "Alice", "score": 8 }
            ],
            "team_scores": []
        }))
        .await;
    fixture
        .record_session(json!({
            "group_id": group_id,
            "game_name": "Uno",
            "game_date": "2024-11-10T19:00:00Z",
            "player_scores": [
                { "player_id": alice_id, "player_name": "Alice", "score": 3 }
            ],
            "team_scores": []
        }))
        .await;

    // game_name filter: only the Catan bucket contributes
    let by_game = fixture
        .get_json(&format!(
            "/api/groups/{}/leaderboard/players?game_name=Catan",
            group_id
        ))
        .await;
    assert_eq!(by_game.as_array().unwrap().len(), 1);
    assert_eq!(by_game[0]["games_played"], 1);
    assert_eq!(by_game[0]["total_score"], 8);
    // Single-score bucket normalizes to zero
    assert_eq!(by_game[0]["normalized_score"], 0.0);

    // Year window
    let by_year = fixture
        .get_json(&format!(
            "/api/groups/{}/leaderboard/players?year=2024",
            group_id
        ))
        .await;
    assert_eq!(by_year[0]["total_score"], 3);

    // Month out of range
    let bad_month = fixture
        .client
        .get(fixture.url(&format!(
            "/api/groups/{}/leaderboard/players?year=2025&month=13",
            group_id
        )))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_month.status(), 400);

    // Players with no sessions in the window are absent entirely
    let idle = fixture.create_player(group_id, "Idle").await;
    let by_year_again = fixture
        .get_json(&format!(
            "/api/groups/{}/leaderboard/players?year=2024",
            group_id
        ))
        .await;
    assert!(by_year_again
        .as_array()
        .unwrap()
        .iter()
        .all(|e| e["id"] != idle["id"]));
}

#[tokio::test]
async fn test_group_stats_agree_with_leaderboard() {
    let fixture = TestFixture::new().await;

    let group = fixture.create_group("Crew").await;
    let group_id = group["id"].as_str().unwrap();
    let alice = fixture.create_player(group_id, "Alice").await;
    let bob = fixture.create_player(group_id, "Bob").await;
    let alice_id = alice["id"].as_str().unwrap();
    let bob_id = bob["id"].as_str().unwrap();
    fixture.create_team(group_id, "Reds", &[alice_id]).await;

    for (game, date, alice_score, bob_score) in [
        ("Catan", "2025-01-10T19:00:00Z", 8, 10),
        ("Catan", "2025-01-17T19:00:00Z", 6, 4),
        ("Uno", "2025-01-24T19:00:00Z", 2, 1),
    ] {
        fixture
            .record_session(json!({
                "group_id": group_id,
                "game_name": game,
                "game_date": date,
                "player_scores": [
                    { "player_id": alice_id, "player_name": "Alice", "score": alice_score },
                    { "player_id": bob_id, "player_name": "Bob", "score": bob_score }
                ],
                "team_scores": []
            }))
            .await;
    }

    let stats = fixture
        .get_json(&format!("/api/groups/{}/stats", group_id))
        .await;
    assert_eq!(stats["total_players"], 2);
    assert_eq!(stats["total_teams"], 1);
    assert_eq!(stats["total_games"], 3);
    assert_eq!(stats["most_played_game"], "Catan");

    // top_player matches the head of the raw leaderboard, same convention
    let board = fixture
        .get_json(&format!("/api/groups/{}/leaderboard/players", group_id))
        .await;
    assert_eq!(stats["top_player"], board[0]);
    assert_eq!(stats["top_player"]["id"], alice_id);
    assert_eq!(stats["top_player"]["total_score"], 16);
    // 16 / 3 rounded at the presentation boundary
    assert_eq!(stats["top_player"]["average_score"], 5.33);
}

#[tokio::test]
async fn test_csv_export_dual_columns() {
    let fixture = TestFixture::new().await;

    let group = fixture.create_group("Crew").await;
    let group_id = group["id"].as_str().unwrap();
    let alice = fixture.create_player(group_id, "Alice").await;
    let bob = fixture.create_player(group_id, "Bob").await;
    let alice_id = alice["id"].as_str().unwrap();
    let bob_id = bob["id"].as_str().unwrap();
    let team = fixture.create_team(group_id, "Reds", &[alice_id, bob_id]).await;
    let team_id = team["id"].as_str().unwrap();

    fixture
        .record_session(json!({
            "group_id": group_id,
            "game_name": "Catan",
            "game_date": "2025-01-10T19:00:00Z",
            "player_scores": [
                { "player_id": alice_id, "player_name": "Alice", "score": 10 },
                { "player_id": bob_id, "player_name": "Bob", "score": 4 }
            ],
            "team_scores": [
                { "team_id": team_id, "team_name": "Reds", "score": 6,
                  "player_ids": [alice_id, bob_id] }
            ]
        }))
        .await;

    let resp = fixture
        .client
        .get(fixture.url(&format!("/api/groups/{}/export/csv", group_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let csv = resp.text().await.unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Type,ID,Name,Games Played,Raw Total Score,Raw Average Score,Normalized Total Score"
    );

    // Bucket is {10, 4, 6}: Alice hit the max -> 1.0, plus her fractional
    // team share (6-4)/6 / 2 = 0.167 -> 1.167 after rounding
    let alice_row = csv
        .lines()
        .find(|l| l.contains("Alice"))
        .unwrap();
    assert!(alice_row.starts_with("Player,"));
    assert!(alice_row.ends_with(",1.167"), "row was: {}", alice_row);

    let team_row = csv.lines().find(|l| l.contains("Reds")).unwrap();
    assert!(team_row.starts_with("Team,"));
    // Raw 6 over 1 game, normalized (6-4)/6 = 0.333
    assert!(team_row.contains(",6,6.00,"), "row was: {}", team_row);
    assert!(team_row.ends_with(",0.333"), "row was: {}", team_row);

    // Numbers agree with the normalized leaderboard endpoint
    let board = fixture
        .get_json(&format!(
            "/api/groups/{}/leaderboard/players/normalized",
            group_id
        ))
        .await;
    assert_eq!(board[0]["normalized_score"], 1.167);
}

#[tokio::test]
async fn test_export_import_roundtrip() {
    let fixture = TestFixture::new().await;

    let group = fixture.create_group("Crew").await;
    let group_id = group["id"].as_str().unwrap();
    let alice = fixture.create_player(group_id, "Alice").await;
    let alice_id = alice["id"].as_str().unwrap();
    fixture.create_team(group_id, "Reds", &[alice_id]).await;
    fixture
        .record_session(json!({
            "group_id": group_id,
            "game_name": "Catan",
            "game_date": "2025-01-10T19:00:00Z",
            "player_scores": [
                { "player_id": alice_id, "player_name": "Alice", "score": 9 }
            ],
            "team_scores": []
        }))
        .await;

    let export = fixture
        .get_json(&format!("/api/groups/{}/export", group_id))
        .await;
    assert_eq!(export["players"].as_array().unwrap().len(), 1);
    assert_eq!(export["sessions"].as_array().unwrap().len(), 1);

    // Mutate, then restore from the snapshot
    fixture.create_player(group_id, "Intruder").await;

    let import_resp = fixture
        .client
        .post(fixture.url(&format!("/api/groups/{}/import", group_id)))
        .json(&export)
        .send()
        .await
        .unwrap();
    assert_eq!(import_resp.status(), 200);

    let restored = fixture
        .get_json(&format!("/api/groups/{}/export", group_id))
        .await;
    assert_eq!(restored["players"], export["players"]);
    assert_eq!(restored["teams"], export["teams"]);
    assert_eq!(restored["sessions"], export["sessions"]);

    // Ledger totals came back verbatim with the snapshot
    let players = fixture
        .get_json(&format!("/api/groups/{}/players", group_id))
        .await;
    assert_eq!(players.as_array().unwrap().len(), 1);
    assert_eq!(players[0]["total_score"], 9);

    // Import into an unknown group
    let bad_import = fixture
        .client
        .post(fixture.url("/api/groups/no-such-group/import"))
        .json(&export)
        .send()
        .await
        .unwrap();
    assert_eq!(bad_import.status(), 404);
}

#[tokio::test]
async fn test_not_found_errors() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/groups/non-existent-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let session_resp = fixture
        .client
        .delete(fixture.url("/api/game-sessions/non-existent-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(session_resp.status(), 404);

    // Recording a session against an unknown group never touches the ledger
    let orphan_session = fixture
        .client
        .post(fixture.url("/api/game-sessions"))
        .json(&json!({
            "group_id": "no-such-group",
            "game_name": "Catan",
            "game_date": "2025-01-10T19:00:00Z",
            "player_scores": [],
            "team_scores": []
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(orphan_session.status(), 404);
}
