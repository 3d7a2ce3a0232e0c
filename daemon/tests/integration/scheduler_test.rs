//! ラウンドスケジューラーの統合テスト

use crate::support::overlay::{Behavior, FakeOverlay};
use crate::support::{peer, pk};
use dmsg_daemon::health::{
    Prober, RoundCoordinator, RoundScheduler, SchedulerExit, SchedulerState, StatusStore,
};
use dmsg_daemon::peers::{PeerListSource, PeerSource};
use dmsg_daemon::shutdown::ShutdownController;
use dmsg_daemon_common::config::ReloadPolicy;
use dmsg_daemon_common::types::PeerTarget;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    overlay: Arc<FakeOverlay>,
    status: StatusStore,
    shutdown: ShutdownController,
}

impl Harness {
    fn new() -> Self {
        Self {
            overlay: FakeOverlay::new(),
            status: StatusStore::new(),
            shutdown: ShutdownController::default(),
        }
    }

    fn scheduler(&self, source: PeerListSource) -> RoundScheduler {
        let coordinator =
            RoundCoordinator::new(self.overlay.provider(), Prober::new(Duration::from_secs(5)));
        RoundScheduler::new(
            PeerSource::new(source),
            coordinator,
            self.status.clone(),
            self.shutdown.clone(),
        )
        .with_interval(Duration::from_secs(60))
    }
}

fn write_csv(path: &std::path::Path, peers: &[PeerTarget]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "pk,port").unwrap();
    for target in peers {
        writeln!(file, "{},", target.identity).unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn first_round_runs_immediately_and_rounds_are_independent() {
    let h = Harness::new();
    h.overlay.script(pk(1), Behavior::Online);
    let mut rx = h.status.subscribe();

    let scheduler = h.scheduler(PeerListSource::Static(vec![peer(1), peer(2)]));
    let task = tokio::spawn(scheduler.run());

    let first = rx
        .wait_for(|s| s.rounds_completed >= 1)
        .await
        .unwrap()
        .clone();
    let report = first.last_round.unwrap();
    let first_id = report.round_id;
    assert_eq!(report.online_count(), 1);
    assert_eq!(report.peers.statuses()[0].identity, pk(1));
    assert!(report.peers.statuses()[0].online);
    assert!(!report.peers.statuses()[1].online);

    // 2ラウンド目は1ラウンド目の結果を引き継がない
    h.overlay.script(pk(1), Behavior::Fail);
    h.overlay.script(pk(2), Behavior::Online);

    let second = rx
        .wait_for(|s| s.rounds_completed >= 2)
        .await
        .unwrap()
        .clone();
    let report = second.last_round.unwrap();
    assert!(!report.peers.statuses()[0].online);
    assert!(report.peers.statuses()[1].online);
    assert_ne!(report.round_id, first_id);

    assert_eq!(h.overlay.clients_created(), 2);
    assert_eq!(h.overlay.clients_closed(), 2);

    h.shutdown.request_shutdown();
    let exit = task.await.unwrap();
    assert!(matches!(exit, SchedulerExit::Cancelled));
    assert_eq!(h.status.snapshot().state, SchedulerState::Cancelled);
    assert_eq!(h.status.snapshot().rounds_completed, 2);
}

#[tokio::test(start_paused = true)]
async fn long_round_delays_next_tick_without_overlap_or_burst() {
    let h = Harness::new();
    h.overlay.script(pk(1), Behavior::Online);
    // 1ラウンド目だけ間隔（1秒）より長くかかる
    h.overlay.set_dial_delay_for_first_clients(Duration::from_secs(3), 1);
    let mut rx = h.status.subscribe();

    let start = tokio::time::Instant::now();
    let scheduler = h
        .scheduler(PeerListSource::Static(vec![peer(1)]))
        .with_interval(Duration::from_secs(1));
    let task = tokio::spawn(scheduler.run());

    rx.wait_for(|s| s.rounds_completed >= 4).await.unwrap();
    h.shutdown.request_shutdown();
    assert!(matches!(task.await.unwrap(), SchedulerExit::Cancelled));

    // ラウンドは重ならない
    assert_eq!(h.overlay.max_open_clients(), 1);

    let created = h.overlay.client_created_at();
    assert!(created.len() >= 4);
    assert!(created[0] - start < Duration::from_millis(1));
    // 2ラウンド目は1ラウンド目の完了後
    assert!(created[1] - start >= Duration::from_secs(3));
    // 溜まったティックをまとめて消化せず、以降は間隔どおり
    for pair in created[1..].windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_secs(1));
    }
}

#[tokio::test]
async fn shutdown_before_first_tick_runs_no_round() {
    let h = Harness::new();
    h.shutdown.request_shutdown();

    let exit = h
        .scheduler(PeerListSource::Static(vec![peer(1)]))
        .run()
        .await;

    assert!(matches!(exit, SchedulerExit::Cancelled));
    assert_eq!(h.overlay.clients_created(), 0);
    assert_eq!(h.status.snapshot().rounds_completed, 0);
}

#[tokio::test]
async fn client_init_failure_stops_scheduler() {
    let h = Harness::new();
    h.overlay.fail_client_init();

    let exit = h
        .scheduler(PeerListSource::Static(vec![peer(1)]))
        .run()
        .await;

    assert!(matches!(exit, SchedulerExit::ClientInit(_)));
    assert_eq!(h.status.snapshot().rounds_completed, 0);
    assert!(h.status.last_round().is_none());
}

#[tokio::test]
async fn missing_peer_list_stops_scheduler() {
    let h = Harness::new();

    let exit = h
        .scheduler(PeerListSource::Csv {
            path: PathBuf::from("/nonexistent/dmsg-clients.csv"),
            reload: ReloadPolicy::EveryRound,
        })
        .run()
        .await;

    assert!(matches!(exit, SchedulerExit::PeerLoad(_)));
    assert_eq!(h.overlay.clients_created(), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_during_round_discards_partial_results() {
    let h = Harness::new();
    h.overlay.script(pk(1), Behavior::Hang);
    let mut rx = h.status.subscribe();

    let task = tokio::spawn(h.scheduler(PeerListSource::Static(vec![peer(1)])).run());

    rx.wait_for(|s| s.state == SchedulerState::Running)
        .await
        .unwrap();
    h.shutdown.request_shutdown();

    let exit = task.await.unwrap();
    assert!(matches!(exit, SchedulerExit::Cancelled));
    assert_eq!(h.status.snapshot().rounds_completed, 0);
    assert_eq!(h.status.snapshot().state, SchedulerState::Cancelled);
    assert_eq!(h.overlay.clients_closed(), 1);
}

#[tokio::test]
async fn every_round_policy_rereads_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dmsg-clients.csv");
    write_csv(&path, &[peer(1)]);

    let h = Harness::new();
    h.overlay.script(pk(1), Behavior::Online);
    h.overlay.script(pk(2), Behavior::Online);
    let mut scheduler = h.scheduler(PeerListSource::Csv {
        path: path.clone(),
        reload: ReloadPolicy::EveryRound,
    });

    let first = scheduler.run_round().await.unwrap();
    assert_eq!(first.peers.len(), 1);

    write_csv(&path, &[peer(2), peer(1)]);
    let second = scheduler.run_round().await.unwrap();
    let identities: Vec<_> = second.peers.statuses().iter().map(|s| s.identity).collect();
    assert_eq!(identities, vec![pk(2), pk(1)]);

    // 読み込みに失敗しても前回のリストで続行する
    std::fs::remove_file(&path).unwrap();
    let third = scheduler.run_round().await.unwrap();
    assert_eq!(third.peers.len(), 2);
    assert_eq!(h.status.snapshot().rounds_completed, 3);
}

#[tokio::test]
async fn once_policy_keeps_startup_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dmsg-clients.csv");
    write_csv(&path, &[peer(1)]);

    let h = Harness::new();
    let mut scheduler = h.scheduler(PeerListSource::Csv {
        path: path.clone(),
        reload: ReloadPolicy::Once,
    });

    scheduler.run_round().await.unwrap();
    write_csv(&path, &[peer(1), peer(2), peer(3)]);
    let second = scheduler.run_round().await.unwrap();

    assert_eq!(second.peers.len(), 1);
}
