//! Interactive demo shell wiring the client core against the in-process
//! store. One process plays the part of one browser tab: sign in, add,
//! toggle, delete, with the list re-rendered on every pushed snapshot.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use client::{
    Decision, ItemMutator, ListState, ListSynchronizer, Notice, Notifier, Severity,
    TodoSubmitter,
};
use domain::{Todo, UserId};
use infrastructure::MemoryStore;
use shared::{init_tracing, Config};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::error;

/// Prints notices to the terminal, the CLI's stand-in for a toast surface.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => println!("[{}] {}", notice.title, notice.description),
            Severity::Destructive => eprintln!("[{}] {}", notice.title, notice.description),
        }
    }
}

const HELP: &str = "\
commands:
  login <user-id>   sign in and start the live list
  logout            sign out and clear the list
  add <title>       create a todo
  toggle <n>        flip completion of list entry n
  rm <n>            delete list entry n (asks for confirmation)
  ls                re-render the list
  dump              print the visible list as JSON
  quit              exit";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing().map_err(|e| anyhow::anyhow!("{e}"))?;
    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let store = MemoryStore::new();
    let notifier = Arc::new(ConsoleNotifier);
    let mut submitter = TodoSubmitter::new(Arc::new(store.clone()), notifier.clone())
        .with_rate_limit(Duration::from_millis(config.rate_limit_ms));
    let mutator = ItemMutator::new(Arc::new(store.clone()), notifier.clone());
    let mut list = ListSynchronizer::new(Arc::new(store.clone()));

    println!("live-todo shell ({}); type `help` for commands", config.environment);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let signed_in = list.identity().is_some();
        tokio::select! {
            maybe_snapshot = list.next_change(), if signed_in => {
                if let Some(snapshot) = maybe_snapshot {
                    mutator.retain_busy(&snapshot);
                    render(&list, &mutator);
                }
            }
            maybe_line = lines.next_line() => {
                let Some(line) = maybe_line? else { break };
                if !handle_command(line.trim(), &mut list, &mut submitter, &mutator, &mut lines).await? {
                    break;
                }
            }
        }
    }

    list.shutdown();
    Ok(())
}

/// Returns `false` when the shell should exit.
async fn handle_command(
    line: &str,
    list: &mut ListSynchronizer,
    submitter: &mut TodoSubmitter,
    mutator: &ItemMutator,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<bool> {
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    match cmd {
        "" => {}
        "help" => println!("{HELP}"),
        "login" => {
            if rest.is_empty() {
                println!("usage: login <user-id>");
            } else {
                let user = UserId::from_string(rest.to_string());
                if let Err(e) = list.set_identity(Some(user)).await {
                    error!("Failed to subscribe: {e}");
                    eprintln!("[Error] Could not start the live list");
                }
            }
        }
        "logout" => {
            // Teardown cannot fail: no subscription is opened for `None`.
            let _ = list.set_identity(None).await;
            render(list, mutator);
        }
        "add" => {
            let identity = list.identity().cloned();
            submitter.submit(identity.as_ref(), rest).await;
        }
        "toggle" => {
            if let Some(todo) = entry(list, rest) {
                let _ = mutator.toggle(&todo).await;
            }
        }
        "rm" => {
            if let Some(todo) = entry(list, rest) {
                println!(
                    "Delete '{}'? This action cannot be undone. [y/N]",
                    todo.title
                );
                let answer = lines.next_line().await?.unwrap_or_default();
                let confirmed = matches!(answer.trim(), "y" | "Y" | "yes");
                let _ = mutator.delete(&todo, &Decision(confirmed)).await;
            }
        }
        "ls" => render(list, mutator),
        "dump" => println!("{}", serde_json::to_string_pretty(list.todos())?),
        "quit" | "exit" => return Ok(false),
        other => println!("Unknown command `{other}`; type `help`"),
    }
    Ok(true)
}

/// Resolves a list index argument against the visible snapshot.
fn entry(list: &ListSynchronizer, arg: &str) -> Option<Todo> {
    let index: usize = match arg.parse() {
        Ok(index) => index,
        Err(_) => {
            println!("expected a list index, got `{arg}`");
            return None;
        }
    };
    match list.todos().get(index) {
        Some(todo) => Some(todo.clone()),
        None => {
            println!("no list entry {index}");
            None
        }
    }
}

fn render(list: &ListSynchronizer, mutator: &ItemMutator) {
    match list.state() {
        ListState::NoUser => println!("Please sign in to see todos (`login <user-id>`)"),
        ListState::Loading => println!("Loading todos..."),
        ListState::Ready(todos) if todos.is_empty() => println!("No todos yet"),
        ListState::Ready(todos) => {
            for (index, todo) in todos.iter().enumerate() {
                let mark = if todo.completed { "x" } else { " " };
                let busy = if mutator.is_busy(&todo.id) { " (busy)" } else { "" };
                println!("{index:>3} [{mark}] {}{busy}", todo.title);
            }
        }
    }
}
