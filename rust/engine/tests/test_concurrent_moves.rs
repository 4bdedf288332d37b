use std::sync::{Arc, Barrier};
use std::thread;
use tictac_engine::errors::MatchError;
use tictac_engine::store::{MatchStore, StoreConfig};

#[test]
fn racing_moves_on_one_match_apply_once() {
    let store = Arc::new(MatchStore::new(StoreConfig::default()));
    let created = store.create().expect("create");
    let o = created.players[0].id.clone().expect("o");

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let id = created.id.clone();
            let o = o.clone();
            thread::spawn(move || {
                barrier.wait();
                store.accept_move(&id, Some(i as i64), Some(&o))
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread"))
        .collect();
    let accepted = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(accepted, 1);
    assert!(results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .all(|err| matches!(err, MatchError::Rejected(_))));

    let game = store.read(&created.id, None).expect("read");
    let claimed = game
        .board
        .cells()
        .iter()
        .filter(|cell| cell.is_occupied())
        .count();
    assert_eq!(claimed, 1);
    assert!(game.players[1].is_turn);
}

#[test]
fn independent_matches_progress_in_parallel() {
    let store = Arc::new(MatchStore::new(StoreConfig::default()));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let created = store.create().expect("create");
                let o = created.players[0].id.clone().expect("o");
                let x = created.players[1].id.clone().expect("x");
                for (player, cell) in [(&o, 0), (&x, 3), (&o, 1), (&x, 4), (&o, 2)] {
                    store
                        .accept_move(&created.id, Some(cell), Some(player))
                        .expect("legal move");
                }
                created.id
            })
        })
        .collect();

    for handle in handles {
        let id = handle.join().expect("thread");
        let game = store.read(&id, None).expect("read");
        assert!(game.has_ended);
        assert_eq!(game.players[0].is_winner, Some(true));
    }
    assert_eq!(store.len(), 16);
}

#[test]
fn removal_racing_a_move_never_reports_a_lost_move() {
    let store = Arc::new(MatchStore::new(StoreConfig {
        chain_next_match: true,
        ..StoreConfig::default()
    }));

    for _ in 0..64 {
        let created = store.create().expect("create");
        let o = created.players[0].id.clone().expect("o");
        let barrier = Arc::new(Barrier::new(2));

        let mover = {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let id = created.id.clone();
            thread::spawn(move || {
                barrier.wait();
                store.accept_move(&id, Some(4), Some(&o))
            })
        };
        let remover = {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let id = created.id.clone();
            thread::spawn(move || {
                barrier.wait();
                store.remove(&id)
            })
        };

        let moved = mover.join().expect("mover");
        let removed = remover.join().expect("remover").expect("remove");

        assert!(removed);
        match moved {
            Ok(game) => assert!(game.board.cells()[4].is_occupied()),
            Err(err) => assert!(matches!(err, MatchError::NotFound(_)), "{err}"),
        }
        assert!(matches!(
            store.read(&created.id, None),
            Err(MatchError::NotFound(_))
        ));
    }

    assert!(store.is_empty());
}
