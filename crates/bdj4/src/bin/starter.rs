//! The `starter` process: supervises `main`'s reference-counted lifetime,
//! watches the player UI, and drives the fleet through an orderly
//! shutdown when asked.

use anyhow::{Context, Result};
use bdj4::{init_logging, BaseArgs};
use bdj_bus::{BusServer, Connections, MessageHandler};
use bdj_config::BdjConfig;
use bdj_proto::{MessageCode, Route};
use bdj_starter::{lock_manager_for_profile, route_port, MainSupervisor};
use clap::Parser;
use std::sync::{Arc, Mutex};
use tokio::process::Command;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(version, about = "Starts and supervises the BDJ4 process fleet")]
struct Cli {
    #[command(flatten)]
    base: BaseArgs,

    /// Path to the `main` executable this starter supervises.
    #[arg(long, default_value = "bdj4-main")]
    main_exe: String,
}

struct StarterHandler {
    main: Mutex<MainSupervisor>,
    main_exe: String,
    connections: Arc<Connections>,
}

impl MessageHandler for StarterHandler {
    fn handle(&self, from: Route, code: MessageCode, _args: Vec<u8>) {
        match code {
            MessageCode::MainStartReconn => {
                let cmd = Command::new(&self.main_exe);
                let outcome = self.main.lock().unwrap().request_start(from, cmd);
                match outcome {
                    Ok(bdj_starter::StartOutcome::Reattach) => {
                        let connections = self.connections.clone();
                        tokio::spawn(async move {
                            let _ = connections
                                .send(Route::StarterUi, from, MessageCode::MainStartReattach, None)
                                .await;
                        });
                    }
                    Ok(_) => info!(?from, "main start request handled"),
                    Err(e) => warn!(?from, "failed to start main: {e}"),
                }
            }
            MessageCode::SocketClose => {
                let should_stop = self.main.lock().unwrap().release(from);
                if should_stop {
                    info!("last UI released main, tearing it down");
                    if let Some(mut child) = self.main.lock().unwrap().take_child() {
                        tokio::spawn(async move {
                            #[cfg(unix)]
                            let _ = child.terminate();
                            #[cfg(not(unix))]
                            let _ = child.terminate().await;
                        });
                    }
                }
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging("starter", cli.base.debug);

    let config = BdjConfig::load().context("failed to load configuration")?;
    let profile = cli.base.profile;

    let lock_mgr = lock_manager_for_profile(&config.infra.paths.lock_dir, profile);
    let guard = lock_mgr
        .acquire(Route::StarterUi)
        .context("starter is already running for this profile")?;

    let port = route_port(config.infra.bus.base_port, profile, config.infra.bus.profile_span, Route::StarterUi);
    let server = BusServer::bind(Route::StarterUi, ("127.0.0.1", port)).await.context("failed to bind starter socket")?;
    let connections = server.connections();
    let shutdown = server.shutdown_signal();

    let handler = Arc::new(StarterHandler {
        main: Mutex::new(MainSupervisor::new()),
        main_exe: cli.main_exe.clone(),
        connections: connections.clone(),
    });

    let run_handle = tokio::spawn(server.run(handler));

    wait_for_interrupt().await;
    info!("starter received shutdown request, running fleet shutdown");

    bdj_starter::shutdown_fleet(&lock_mgr, |route, code| {
        let connections = connections.clone();
        async move {
            let _ = connections.send(Route::StarterUi, route, code, None).await;
        }
    })
    .await;

    shutdown.fire();
    let _ = run_handle.await;
    guard.release().ok();
    Ok(())
}

async fn wait_for_interrupt() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
