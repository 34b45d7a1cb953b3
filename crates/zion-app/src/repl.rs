//! Interactive chat loop.

use std::future::Future;
use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use zion_chat::{ChatDispatcher, ChatError, DispatchReport, SessionState, VoiceInput};
use zion_core::portal::catalog;
use zion_core::types::ConversationMessage;
use zion_core::PortalId;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Say(String),
    Portal(PortalId),
    Leave,
    Action(String),
    Task(String),
    Voice,
    Status,
    Help,
    Quit,
    Empty,
    /// Unusable input, with the message to show.
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplCommand::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return ReplCommand::Say(line.to_string());
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        match name {
            "portal" => match arg.parse::<PortalId>() {
                Ok(id) => ReplCommand::Portal(id),
                Err(_) => ReplCommand::Invalid(format!(
                    "usage: /portal <{}>",
                    PortalId::ALL.map(|p| p.as_str()).join("|")
                )),
            },
            "leave" => ReplCommand::Leave,
            "action" if !arg.is_empty() => ReplCommand::Action(arg.to_string()),
            "action" => ReplCommand::Invalid("usage: /action <text>".into()),
            "task" if !arg.is_empty() => ReplCommand::Task(arg.to_string()),
            "task" => ReplCommand::Invalid("usage: /task <title>".into()),
            "voice" => ReplCommand::Voice,
            "status" => ReplCommand::Status,
            "help" => ReplCommand::Help,
            "quit" | "exit" => ReplCommand::Quit,
            other => ReplCommand::Invalid(format!("unknown command /{} (try /help)", other)),
        }
    }
}

const HELP: &str = "\
  <text>            talk to Zion
  /portal <id>      enter a portal
  /leave            back to general chat
  /action <text>    run an action of the active portal
  /task <title>     record a task
  /voice            speak one message (Ctrl-C stops)
  /status           show the loaded data
  /quit             leave";

/// Summary lines for `/status` and `zion status`.
pub fn status_lines(state: &SessionState) -> Vec<String> {
    let data = state.data();
    let mut lines = vec![
        format!("connection: {:?}", state.connection()),
        format!(
            "subscriptions: {} (${}/month)",
            data.subscriptions.len(),
            data.monthly_cost()
        ),
        format!("tasks: {}", data.tasks.len()),
    ];
    match state.active_portal() {
        Some(id) => {
            let portal = id.portal();
            lines.push(format!(
                "portal: {} [{}] {}",
                portal.name,
                portal.insights(data).join(", "),
                portal.actions.join(" | ")
            ));
        }
        None => lines.push("portal: none".to_string()),
    }
    lines
}

pub fn print_message(message: &ConversationMessage) {
    println!("zion> {}", message.text());
}

pub fn print_report(report: Option<DispatchReport>) {
    if let Some(report) = report {
        print_message(&report.reply);
    }
}

/// Listen for one utterance, stopping early when `interrupt` resolves.
pub async fn listen_once<F: Future>(
    voice: &VoiceInput,
    dispatcher: &ChatDispatcher,
    interrupt: F,
) -> Result<Option<DispatchReport>, ChatError> {
    let listening = voice.listen(dispatcher);
    tokio::pin!(listening);
    tokio::select! {
        biased;
        result = &mut listening => result,
        _ = interrupt => {
            voice.stop();
            listening.await
        }
    }
}

fn prompt() {
    print!("you> ");
    let _ = std::io::stdout().flush();
}

/// Read commands from stdin until `/quit` or end of input.
pub async fn run(dispatcher: &ChatDispatcher, voice: &VoiceInput) -> std::io::Result<()> {
    println!(
        "Portals: {}",
        catalog()
            .iter()
            .map(|p| format!("{} ({})", p.id, p.realm))
            .collect::<Vec<_>>()
            .join(", ")
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        match ReplCommand::parse(&line) {
            ReplCommand::Say(text) => print_report(dispatcher.send(&text).await),
            ReplCommand::Portal(id) => print_message(&dispatcher.enter_portal(id)),
            ReplCommand::Leave => match dispatcher.leave_portal() {
                Some(id) => println!("Left {}", id.portal().name),
                None => println!("No active portal"),
            },
            ReplCommand::Action(action) => match dispatcher.state().active_portal() {
                Some(id) => print_report(dispatcher.portal_action(id, &action).await),
                None => println!("Enter a portal first (/portal <id>)"),
            },
            ReplCommand::Task(title) => {
                if let Some(message) = dispatcher.create_task(&title) {
                    print_message(&message);
                }
            }
            ReplCommand::Voice => {
                println!("(listening... Ctrl-C to stop)");
                match listen_once(voice, dispatcher, tokio::signal::ctrl_c()).await {
                    Ok(report) => print_report(report),
                    Err(e) => println!("voice: {}", e),
                }
            }
            ReplCommand::Status => {
                for line in status_lines(&dispatcher.state()) {
                    println!("  {}", line);
                }
            }
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Quit => break,
            ReplCommand::Empty => {}
            ReplCommand::Invalid(message) => println!("{}", message),
        }
        prompt();
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
