use std::sync::Arc;
use tictac_engine::ids::AlphanumericIds;
use tictac_engine::store::{MatchStore, StoreConfig};
use tictac_engine::view::PublicMatch;

fn store() -> MatchStore {
    MatchStore::with_id_generator(
        Arc::new(AlphanumericIds::with_seed(5, 2024)),
        StoreConfig::default(),
    )
}

fn player_ids(created: &PublicMatch) -> (String, String) {
    (
        created.players[0].id.clone().expect("O id disclosed on create"),
        created.players[1].id.clone().expect("X id disclosed on create"),
    )
}

fn cells(game: &PublicMatch) -> Vec<&'static str> {
    game.board.cells().iter().map(|cell| cell.as_str()).collect()
}

#[test]
fn read_without_requester_hides_both_ids() {
    let store = store();
    let created = store.create().expect("create");

    let read = store.read(&created.id, None).expect("read");
    assert_eq!(read.id, created.id);
    assert!(read.players.iter().all(|player| player.id.is_none()));
    assert_eq!(read.players[0].name, "Player O");
    assert!(read.players[0].is_turn);
    assert!(!read.players[1].is_turn);
    assert!(!read.has_ended);
}

#[test]
fn read_with_requester_keeps_only_their_id() {
    let store = store();
    let created = store.create().expect("create");
    let (o, _) = player_ids(&created);

    let read = store.read(&created.id, Some(&o)).expect("read");
    assert_eq!(read.players[0].id.as_deref(), Some(o.as_str()));
    assert_eq!(read.players[1].id, None);
}

#[test]
fn first_move_claims_cell_and_passes_turn() {
    let store = store();
    let created = store.create().expect("create");
    let (o, _) = player_ids(&created);

    let after = store
        .accept_move(&created.id, Some(0), Some(&o))
        .expect("first move");
    assert_eq!(cells(&after), vec!["O", "", "", "", "", "", "", "", ""]);
    assert!(!after.players[0].is_turn);
    assert!(after.players[1].is_turn);
    assert_eq!(after.players[0].id.as_deref(), Some(o.as_str()));
    assert_eq!(after.players[1].id, None);
}

#[test]
fn top_row_wins_for_o() {
    let store = store();
    let created = store.create().expect("create");
    let (o, x) = player_ids(&created);

    let moves = [(&o, 0), (&x, 3), (&o, 1), (&x, 4), (&o, 2)];
    let mut last = None;
    for (player, cell) in moves {
        last = Some(
            store
                .accept_move(&created.id, Some(cell), Some(player))
                .expect("legal move"),
        );
    }
    let finished = last.expect("moves played");

    assert!(finished.has_ended);
    assert_eq!(finished.board.winning_index_trio(), Some([0, 1, 2]));
    assert_eq!(finished.players[0].is_winner, Some(true));
    assert_eq!(finished.players[1].is_winner, None);
    assert_eq!(finished.next_id, None);
}

#[test]
fn full_board_without_trio_is_a_draw() {
    let store = store();
    let created = store.create().expect("create");
    let (o, x) = player_ids(&created);

    // O X O
    // O X X
    // X O O
    let moves = [
        (&o, 0),
        (&x, 1),
        (&o, 2),
        (&x, 4),
        (&o, 3),
        (&x, 5),
        (&o, 7),
        (&x, 6),
        (&o, 8),
    ];
    let mut last = None;
    for (player, cell) in moves {
        last = Some(
            store
                .accept_move(&created.id, Some(cell), Some(player))
                .expect("legal move"),
        );
    }
    let finished = last.expect("moves played");

    assert!(finished.has_ended);
    assert_eq!(finished.board.winning_index_trio(), None);
    assert!(finished.players.iter().all(|p| p.is_winner.is_none()));
    assert_eq!(
        cells(&finished),
        vec!["O", "X", "O", "O", "X", "X", "X", "O", "O"]
    );
}

#[test]
fn turns_stay_complementary_until_the_end() {
    let store = store();
    let created = store.create().expect("create");
    let (o, x) = player_ids(&created);

    for (player, cell) in [(&o, 4), (&x, 0), (&o, 8), (&x, 2), (&o, 1)] {
        let after = store
            .accept_move(&created.id, Some(cell), Some(player))
            .expect("legal move");
        assert_ne!(after.players[0].is_turn, after.players[1].is_turn);
    }
}

#[test]
fn removed_match_is_gone() {
    let store = store();
    let created = store.create().expect("create");

    assert!(store.remove(&created.id).expect("remove"));
    assert!(store.read(&created.id, None).is_err());
}
