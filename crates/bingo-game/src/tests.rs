//! End-to-end tests for `Game` over an in-memory SQLite store.

use std::collections::HashSet;

use bingo_core::{
  Error,
  card::{CARD_SIZE, FREE_CELL},
  event::EventPayload,
  identity::{Caller, Role},
  pattern::Pattern,
  room::SeatRole,
  session::POOL_SIZE,
};
use bingo_store_sqlite::SqliteStore;
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::Game;

async fn game() -> Game<SqliteStore> {
  Game::new(SqliteStore::open_in_memory().await.expect("in-memory store"))
}

fn caller(role: Role) -> Caller { Caller::new(Uuid::new_v4(), role) }

async fn audit_actions(game: &Game<SqliteStore>) -> Vec<String> {
  game
    .list_audit(caller(Role::Admin), None)
    .await
    .unwrap()
    .into_iter()
    .map(|e| e.action)
    .collect()
}

// ─── Scenarios ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_game_until_the_pool_runs_dry() {
  let game = game().await;
  let host = caller(Role::Host);
  let player = caller(Role::Player);

  let room = game.create_room(host).await.unwrap();
  let code = room.code.as_str();
  assert_eq!(code.len(), 7);
  assert!(code[..3].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
  assert_eq!(&code[3..4], "-");
  assert!(code[4..].chars().all(|c| c.is_ascii_digit()));

  game.join_room(player, room.room_id).await.unwrap();
  let seats = game.list_participants(code).await.unwrap();
  assert_eq!(seats.len(), 2);
  assert_eq!((seats[0].user_id, seats[0].role), (host.user_id, SeatRole::Host));
  assert_eq!((seats[1].user_id, seats[1].role), (player.user_id, SeatRole::Player));

  let card = game.generate_card(player, room.room_id).await.unwrap();
  assert_eq!(card.numbers.rows().len(), CARD_SIZE);
  assert_eq!(card.numbers.cell(2, 2), FREE_CELL);

  let session = game.start_session(host, room.room_id).await.unwrap();
  assert!(session.is_active);
  assert!(game.get_room(room.room_id).await.unwrap().is_closed);

  let mut seen = HashSet::new();
  for expected in 1..=u16::from(POOL_SIZE) {
    let draw = game.draw_next(host, session.session_id).await.unwrap();
    assert_eq!(draw.sequence, expected);
    assert!((1..=POOL_SIZE).contains(&draw.number));
    assert!(seen.insert(draw.number), "number {} drawn twice", draw.number);
  }
  let err = game.draw_next(host, session.session_id).await.unwrap_err();
  assert!(matches!(err, Error::PoolExhausted(_)));
}

#[tokio::test]
async fn first_row_wins_and_a_second_claim_is_refused() {
  let game = game().await;
  let mut events = game.subscribe();
  let host = caller(Role::Host);
  let player = caller(Role::Player);

  let room = game.create_room(host).await.unwrap();
  game.join_room(player, room.room_id).await.unwrap();
  let card = game.generate_card(player, room.room_id).await.unwrap();
  let session = game.start_session(host, room.room_id).await.unwrap();

  let first_row: HashSet<u8> = card.numbers.rows()[0].iter().copied().collect();
  let mut drawn = HashSet::new();
  while !first_row.is_subset(&drawn) {
    drawn.insert(game.draw_next(host, session.session_id).await.unwrap().number);
  }

  let win = game.validate_bingo(player, session.session_id).await.unwrap();
  assert_eq!(win.pattern, Pattern::Row { index: 0 });
  assert!(win.pattern.to_string().contains("row"));
  assert_eq!(win.session.winner_id, Some(player.user_id));
  assert_eq!(win.session.winning_card_id, Some(card.card_id));
  assert!(!win.session.is_active);

  let again = game.validate_bingo(player, session.session_id).await.unwrap_err();
  assert!(matches!(again, Error::WinnerAlreadyDeclared(_)));

  let record = game.get_history(session.session_id).await.unwrap();
  assert!(record.is_completed);
  assert_eq!(record.winner_id, Some(player.user_id));
  assert_eq!(record.winning_card_hash.as_deref(), Some(card.content_hash.as_str()));
  let in_order: Vec<u8> = game
    .list_draws(session.session_id)
    .await
    .unwrap()
    .into_iter()
    .map(|d| d.number)
    .collect();
  assert_eq!(record.drawn_numbers, in_order);

  let mut kinds = Vec::new();
  while let Ok(event) = events.try_recv() {
    assert_eq!(event.room_code, room.code.as_str());
    kinds.push(event.payload.event_type());
  }
  assert_eq!(kinds.first(), Some(&"session_started"));
  assert_eq!(kinds.last(), Some(&"winner_declared"));
  assert_eq!(kinds.iter().filter(|k| **k == "number_drawn").count(), in_order.len());

  let actions = audit_actions(&game).await;
  assert!(actions.contains(&"BINGO by row 1".to_owned()));
}

#[tokio::test]
async fn sole_occupant_leaving_deletes_the_room() {
  let game = game().await;
  let host = caller(Role::Host);
  let room = game.create_room(host).await.unwrap();

  let left = game.leave_room(host).await.unwrap();
  assert!(left.room_deleted);
  assert_eq!(left.room.room_id, room.room_id);

  let err = game.join_room(caller(Role::Player), room.room_id).await.unwrap_err();
  assert!(matches!(err, Error::RoomNotFound(_)));

  let actions = audit_actions(&game).await;
  assert!(actions.contains(&format!("Left room {}", room.code)));
  assert!(actions.contains(&format!("Auto-deleted empty room {}", room.code)));
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_claims_produce_one_winner() {
  let game = game().await;
  let host = caller(Role::Host);
  let room = game.create_room(host).await.unwrap();

  let players: Vec<Caller> = (0..8).map(|_| caller(Role::Player)).collect();
  for p in &players {
    game.join_room(*p, room.room_id).await.unwrap();
    game.generate_card(*p, room.room_id).await.unwrap();
  }
  let session = game.start_session(host, room.room_id).await.unwrap();
  for _ in 0..POOL_SIZE {
    game.draw_next(host, session.session_id).await.unwrap();
  }

  let mut claims = JoinSet::new();
  for p in players.iter().copied() {
    let game = game.clone();
    let session_id = session.session_id;
    claims.spawn(async move { (p.user_id, game.validate_bingo(p, session_id).await) });
  }

  let mut winners = Vec::new();
  while let Some(joined) = claims.join_next().await {
    match joined.unwrap() {
      (user_id, Ok(_)) => winners.push(user_id),
      (_, Err(Error::WinnerAlreadyDeclared(_))) => {}
      (_, Err(other)) => panic!("unexpected claim failure: {other}"),
    }
  }
  assert_eq!(winners.len(), 1);

  let ended = game.get_session(session.session_id).await.unwrap();
  assert_eq!(ended.winner_id, Some(winners[0]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_draws_never_repeat_a_number() {
  let game = game().await;
  let host = caller(Role::Host);
  let room = game.create_room(host).await.unwrap();
  let session = game.start_session(host, room.room_id).await.unwrap();

  let mut draws = JoinSet::new();
  for _ in 0..100 {
    let game = game.clone();
    let session_id = session.session_id;
    draws.spawn(async move { game.draw_next(host, session_id).await });
  }

  let mut drawn = Vec::new();
  let mut exhausted = 0;
  while let Some(joined) = draws.join_next().await {
    match joined.unwrap() {
      Ok(draw) => drawn.push(draw),
      Err(Error::PoolExhausted(_)) => exhausted += 1,
      Err(other) => panic!("unexpected draw failure: {other}"),
    }
  }
  let pool = usize::from(POOL_SIZE);
  assert_eq!(drawn.len(), pool);
  assert_eq!(exhausted, 100 - pool);

  let numbers: HashSet<u8> = drawn.iter().map(|d| d.number).collect();
  assert_eq!(numbers.len(), pool);
  let sequences: HashSet<u16> = drawn.iter().map(|d| d.sequence).collect();
  assert_eq!(sequences, (1..=u16::from(POOL_SIZE)).collect());

  let stored = game.list_draws(session.session_id).await.unwrap();
  assert_eq!(stored.len(), pool);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_joins_seat_a_user_once() {
  let game = game().await;
  let first = game.create_room(caller(Role::Host)).await.unwrap();
  let second = game.create_room(caller(Role::Host)).await.unwrap();
  let player = caller(Role::Player);

  let mut joins = JoinSet::new();
  for room_id in [first.room_id, second.room_id, first.room_id, second.room_id] {
    let game = game.clone();
    joins.spawn(async move { (room_id, game.join_room(player, room_id).await) });
  }

  let mut seated = Vec::new();
  while let Some(joined) = joins.join_next().await {
    match joined.unwrap() {
      (room_id, Ok(_)) => seated.push(room_id),
      (_, Err(Error::AlreadyInRoom(_))) => {}
      (_, Err(other)) => panic!("unexpected join failure: {other}"),
    }
  }
  assert_eq!(seated.len(), 1);

  let current = game.current_room(player).await.unwrap().unwrap();
  assert_eq!(current.room_id, seated[0]);
  let other = if seated[0] == first.room_id { &second } else { &first };
  let seats = game.list_participants(other.code.as_str()).await.unwrap();
  assert!(seats.iter().all(|s| s.user_id != player.user_id));
}

// ─── Rooms ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn room_creation_rules() {
  let game = game().await;

  let err = game.create_room(caller(Role::Player)).await.unwrap_err();
  assert!(matches!(err, Error::PermissionDenied(_)));

  let host = caller(Role::Host);
  let room = game.create_room(host).await.unwrap();
  let err = game.create_room(host).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyInRoom(_)));

  let admin = caller(Role::Admin);
  game.create_room(admin).await.unwrap();
  assert_eq!(game.list_rooms().await.unwrap().len(), 2);
  assert_eq!(game.current_room(host).await.unwrap().map(|r| r.room_id), Some(room.room_id));

  let actions = audit_actions(&game).await;
  assert!(actions.contains(&format!("Created room {}", room.code)));
}

#[tokio::test]
async fn joining_rules() {
  let game = game().await;
  let host = caller(Role::Host);
  let player = caller(Role::Player);
  let room = game.create_room(host).await.unwrap();

  let err = game.join_room(player, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::RoomNotFound(_)));

  game.join_room(player, room.room_id).await.unwrap();
  let err = game.join_room(player, room.room_id).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyInRoom(_)));

  game.start_session(host, room.room_id).await.unwrap();
  let err = game.join_room(caller(Role::Player), room.room_id).await.unwrap_err();
  assert!(matches!(err, Error::RoomClosed(_)));

  let err = game.leave_room(caller(Role::Player)).await.unwrap_err();
  assert!(matches!(err, Error::NotInAnyRoom(_)));
}

#[tokio::test]
async fn deleting_rooms() {
  let game = game().await;
  let host = caller(Role::Host);
  let room = game.create_room(host).await.unwrap();

  let err = game.delete_room(caller(Role::Admin), room.room_id).await.unwrap_err();
  assert!(matches!(err, Error::PermissionDenied(_)));

  let session = game.start_session(host, room.room_id).await.unwrap();
  let err = game.delete_room(host, room.room_id).await.unwrap_err();
  assert!(matches!(err, Error::SessionActive(_)));

  game.end_session(host, session.session_id).await.unwrap();
  game.delete_room(host, room.room_id).await.unwrap();
  assert!(matches!(game.get_room(room.room_id).await, Err(Error::RoomNotFound(_))));
  assert!(game.current_room(host).await.unwrap().is_none());

  let err = game.delete_room(host, room.room_id).await.unwrap_err();
  assert!(matches!(err, Error::RoomNotFound(_)));
}

#[tokio::test]
async fn unknown_code_has_no_participants() {
  let game = game().await;
  let err = game.list_participants("ZZZ-000").await.unwrap_err();
  assert!(matches!(err, Error::RoomNotFound(_)));
}

// ─── Cards ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn card_rules() {
  let game = game().await;
  let host = caller(Role::Host);
  let player = caller(Role::Player);
  let room = game.create_room(host).await.unwrap();

  let err = game.generate_card(player, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::RoomNotFound(_)));
  let err = game.generate_card(player, room.room_id).await.unwrap_err();
  assert!(matches!(err, Error::NotInRoom { .. }));

  game.join_room(player, room.room_id).await.unwrap();
  let card = game.generate_card(player, room.room_id).await.unwrap();
  let err = game.generate_card(player, room.room_id).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateCard { .. }));

  assert_eq!(game.card_for(player, room.room_id).await.unwrap().card_id, card.card_id);
  let err = game.card_for(host, room.room_id).await.unwrap_err();
  assert!(matches!(err, Error::NoCardInRoom { .. }));
  assert_eq!(game.list_cards(room.room_id).await.unwrap().len(), 1);

  let actions = audit_actions(&game).await;
  let expected = format!("Generated card for room {} with hash {}", room.code, card.content_hash);
  assert!(actions.contains(&expected));
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_control_is_for_creator_or_admin() {
  let game = game().await;
  let host = caller(Role::Host);
  let player = caller(Role::Player);
  let room = game.create_room(host).await.unwrap();
  game.join_room(player, room.room_id).await.unwrap();

  let err = game.start_session(player, room.room_id).await.unwrap_err();
  assert!(matches!(err, Error::PermissionDenied(_)));
  let session = game.start_session(host, room.room_id).await.unwrap();
  let err = game.start_session(host, room.room_id).await.unwrap_err();
  assert!(matches!(err, Error::SessionAlreadyStarted(_)));

  let err = game.draw_next(player, session.session_id).await.unwrap_err();
  assert!(matches!(err, Error::PermissionDenied(_)));
  let draw = game.draw_next(caller(Role::Admin), session.session_id).await.unwrap();
  assert_eq!(draw.sequence, 1);

  let err = game.end_session(player, session.session_id).await.unwrap_err();
  assert!(matches!(err, Error::PermissionDenied(_)));

  let err = game.draw_next(host, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::SessionNotFound(_)));
}

#[tokio::test]
async fn ending_a_session_records_history_once() {
  let game = game().await;
  let mut events = game.subscribe();
  let host = caller(Role::Host);
  let player = caller(Role::Player);
  let room = game.create_room(host).await.unwrap();
  game.join_room(player, room.room_id).await.unwrap();
  game.generate_card(player, room.room_id).await.unwrap();
  let session = game.start_session(host, room.room_id).await.unwrap();
  let draw = game.draw_next(host, session.session_id).await.unwrap();

  let ended = game.end_session(host, session.session_id).await.unwrap();
  assert!(!ended.is_active);
  assert!(ended.winner_id.is_none());

  let err = game.end_session(host, session.session_id).await.unwrap_err();
  assert!(matches!(err, Error::SessionAlreadyEnded(_)));
  let err = game.draw_next(host, session.session_id).await.unwrap_err();
  assert!(matches!(err, Error::SessionInactive(_)));
  let err = game.validate_bingo(player, session.session_id).await.unwrap_err();
  assert!(matches!(err, Error::SessionEnded(_)));

  let record = game.get_history(session.session_id).await.unwrap();
  assert!(record.is_completed);
  assert!(record.winner_id.is_none());
  assert!(record.winning_card_hash.is_none());
  assert_eq!(record.drawn_numbers, vec![draw.number]);
  assert_eq!(record.room_code, room.code.as_str());

  let again = game.snapshot_history(session.session_id).await.unwrap();
  assert_eq!(again.history_id, record.history_id);
  assert_eq!(game.list_history().await.unwrap().len(), 1);

  let mut last = None;
  while let Ok(event) = events.try_recv() {
    last = Some(event.payload);
  }
  assert_eq!(last, Some(EventPayload::SessionEnded { session_id: session.session_id }));
}

#[tokio::test]
async fn snapshot_refuses_running_sessions() {
  let game = game().await;
  let host = caller(Role::Host);
  let room = game.create_room(host).await.unwrap();
  let session = game.start_session(host, room.room_id).await.unwrap();

  let err = game.snapshot_history(session.session_id).await.unwrap_err();
  assert!(matches!(err, Error::SessionActive(_)));
  let err = game.get_history(session.session_id).await.unwrap_err();
  assert!(matches!(err, Error::HistoryNotFound(_)));
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn claims_without_a_line_or_a_card_fail() {
  let game = game().await;
  let host = caller(Role::Host);
  let player = caller(Role::Player);
  let room = game.create_room(host).await.unwrap();
  game.join_room(player, room.room_id).await.unwrap();
  game.generate_card(player, room.room_id).await.unwrap();
  let session = game.start_session(host, room.room_id).await.unwrap();

  let err = game.validate_bingo(player, session.session_id).await.unwrap_err();
  assert!(matches!(err, Error::NoWinningPattern));
  let err = game.validate_bingo(host, session.session_id).await.unwrap_err();
  assert!(matches!(err, Error::NoCardInRoom { .. }));
  let err = game.validate_bingo(player, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::SessionNotFound(_)));

  let actions = audit_actions(&game).await;
  assert_eq!(actions.iter().filter(|a| *a == "Invalid bingo attempt").count(), 1);
  assert!(game.get_session(session.session_id).await.unwrap().is_active);
}

#[tokio::test]
async fn audit_log_is_admin_only() {
  let game = game().await;
  let err = game.list_audit(caller(Role::Host), None).await.unwrap_err();
  assert!(matches!(err, Error::PermissionDenied(_)));

  let host = caller(Role::Host);
  game.create_room(host).await.unwrap();
  let player = caller(Role::Player);
  let room = game.current_room(host).await.unwrap().unwrap();
  game.join_room(player, room.room_id).await.unwrap();

  let newest = game.list_audit(caller(Role::Admin), Some(1)).await.unwrap();
  assert_eq!(newest.len(), 1);
  assert_eq!(newest[0].action, format!("Joined room {}", room.code));
  assert_eq!(newest[0].actor_id, player.user_id);
}
