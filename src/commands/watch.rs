use parser_console::error::AppResult;
use parser_console::shell::Shell;

use super::{interrupt_token, render};

pub async fn run(shell: &Shell) -> AppResult<()> {
    shell.require_token()?;
    let mut balance = shell.balance();
    let mut sessions = shell.subscribe();
    let refresher = shell.spawn_balance_refresher();
    let watcher = shell.spawn_expiry_watcher();
    let cancel = interrupt_token();

    println!("Watching session, Ctrl-C to stop");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = balance.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(reading) = *balance.borrow_and_update() {
                    println!("{}  {}", render::timestamp(reading.fetched_at), reading.balance);
                }
            }
            changed = sessions.changed() => {
                if changed.is_err() || sessions.borrow_and_update().is_none() {
                    println!("Session ended, logged out");
                    break;
                }
            }
        }
    }

    shell.shutdown();
    let _ = tokio::join!(refresher, watcher);
    Ok(())
}
