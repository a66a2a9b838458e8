use std::sync::Arc;

use chrono::Utc;
use tokio::time::{Duration, sleep};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use triage_core::app::{ActivationSweep, TaskService};
use triage_core::domain::{NewTask, Task, TaskKind};
use triage_core::impls::{InMemoryTaskRepository, RecordingEventSink, SystemClock};

fn print_ranked(header: &str, tasks: &[Task]) {
    println!("{header}");
    for task in tasks {
        let blocks = task
            .ultimately_blocks
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>5.2}  {}  active={}  ultimately_blocks={}  ({})",
            task.effective_density, task.id, task.is_active, blocks, task.name
        );
    }
}

#[tokio::main]
async fn main() {
    // (A) ログとサービス一式を用意
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("triage_core=info")))
        .init();

    let repository = Arc::new(InMemoryTaskRepository::new());
    let clock = Arc::new(SystemClock);
    let events = Arc::new(RecordingEventSink::new());
    let service = Arc::new(TaskService::new(
        Arc::clone(&repository),
        clock,
        Arc::clone(&events),
    ));

    // (B) 引っ越しシナリオを投入（movers だけ2秒後に活性化）
    let movers = service
        .create_task(NewTask {
            name: "book the movers".to_string(),
            importance: 9,
            effort: 2,
            kind: TaskKind::Home,
            activation_time: Utc::now() + chrono::Duration::seconds(2),
        })
        .await
        .expect("create movers");
    let boxes = service
        .create_task(NewTask {
            name: "pack the boxes".to_string(),
            importance: 8,
            effort: 5,
            kind: TaskKind::Home,
            activation_time: Utc::now(),
        })
        .await
        .expect("create boxes");
    let truck = service
        .create_task(NewTask {
            name: "rent the truck".to_string(),
            importance: 5,
            effort: 5,
            kind: TaskKind::Home,
            activation_time: Utc::now(),
        })
        .await
        .expect("create truck");
    service
        .create_task(NewTask {
            name: "do the laundry".to_string(),
            importance: 2,
            effort: 5,
            kind: TaskKind::Home,
            activation_time: Utc::now(),
        })
        .await
        .expect("create laundry");

    // boxes が済まないと movers が進まず、truck が済まないと boxes が進まない
    service
        .add_dependent_tasks(boxes.id, &[movers.id])
        .await
        .expect("link movers under boxes");
    service
        .add_dependent_tasks(truck.id, &[boxes.id])
        .await
        .expect("link boxes under truck");

    print_ranked("ranked before activation:", &repository.list_ranked().await);

    // (C) sweep を起動して movers の活性化を待つ
    let sweep = ActivationSweep::spawn(Arc::clone(&service), Duration::from_millis(500));
    sleep(Duration::from_secs(3)).await;

    // (D) 活性化が連鎖で truck まで届いたことを確認
    print_ranked("ranked after activation:", &repository.list_ranked().await);
    let recorded = events.recorded().await;
    println!(
        "events: {}",
        serde_json::to_string(&recorded).expect("events serialize")
    );

    // (E) サンプルなので sweep を止めて終わる
    sweep.shutdown_and_join().await;
}
