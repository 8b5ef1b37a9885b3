//! services/app/src/bin/app.rs
//!
//! A line-oriented shell over the application controller. Talks to the api
//! server at `API_BASE_URL` when set, otherwise to an in-process copy of the
//! seeded backend.

use std::sync::Arc;

use api_lib::{config::Config, seeded_state, web::api_routes};
use app_lib::{
    config::AppConfig, error::AppError, ApiClient, AppController, FileStorage, HttpTransport,
    RouterTransport, Transport,
};
use kids_learning_core::{guard::RoutingGuard, views::RouteTable, Role};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
commands:
  go <path> | back | where
  role <kid|parent|teacher|admin> | logout
  parent <email> <name...> | teacher <email> | admin <email> <name...>
  addkid <age> <name...> | kid <kid_id> | pin <kid_id> <pin> | exit [pin]
  teachers | courses | activities | mine | complete <activity_id> | progress <kid_id>
  verify <teacher_id> <status> | course <course_id> <status> | activity <activity_id> <status>
  chat <other_id> | say <conversation_id> <text...>
  help | quit";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = AppConfig::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- 2. Wire Storage and Choose a Backend ---
    let storage = Arc::new(FileStorage::new(&config.state_dir)?);
    info!("Persisting session under {}", storage.dir().display());
    let guard = RoutingGuard::new(RouteTable::new());

    match &config.api_base_url {
        Some(base_url) => {
            let transport = HttpTransport::new(base_url.as_str())?;
            info!("Using api server at {}", transport.base_url());
            shell(AppController::new(ApiClient::new(transport), storage, guard)).await
        }
        None => {
            info!("API_BASE_URL not set; using an in-process seeded backend");
            let router = api_routes(seeded_state(Config::default()));
            let api = ApiClient::new(RouterTransport::new(router));
            shell(AppController::new(api, storage, guard)).await
        }
    }
}

// --- 3. Read Commands ---
async fn shell<T: Transport>(mut app: AppController<T>) -> Result<(), AppError> {
    app.load_collections().await;
    println!("{}", HELP);
    println!("at {} ({})", app.current_path(), app.current_view());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((command, args)) = words.split_first() else {
            continue;
        };
        if *command == "quit" {
            break;
        }
        if let Err(e) = run(&mut app, command, args).await {
            println!("error: {}", e);
        }
        println!("at {} ({})", app.current_path(), app.current_view());
    }
    Ok(())
}

fn arg<'a>(args: &[&'a str], index: usize) -> Result<&'a str, AppError> {
    args.get(index)
        .copied()
        .ok_or_else(|| AppError::NotAllowed(format!("missing argument {}", index + 1)))
}

/// The words from `from` on, joined back with single spaces.
fn rest(args: &[&str], from: usize) -> String {
    args.get(from..).unwrap_or_default().join(" ")
}

async fn run<T: Transport>(
    app: &mut AppController<T>,
    command: &str,
    args: &[&str],
) -> Result<(), AppError> {
    match command {
        "help" => println!("{}", HELP),
        "go" => {
            app.navigate(arg(args, 0)?);
        }
        "back" => {
            app.back();
        }
        "where" => println!("history: {}", app.history().join(" > ")),
        "role" => {
            let role: Role = arg(args, 0)?
                .parse()
                .map_err(|_| AppError::NotAllowed("unknown role".to_string()))?;
            app.select_role(role);
        }
        "logout" => {
            app.logout();
        }
        "parent" => {
            let parent = app.login_parent(&rest(args, 1), arg(args, 0)?)?;
            println!("signed in as {} ({})", parent.name, parent.id);
        }
        "teacher" => {
            let teacher = app.login_teacher(arg(args, 0)?)?;
            println!("signed in as {} ({:?})", teacher.name, teacher.verification_status);
        }
        "admin" => {
            let admin = app.login_admin(&rest(args, 1), arg(args, 0)?)?;
            println!("signed in as admin {}", admin.id);
        }
        "addkid" => {
            let age = arg(args, 0)?
                .parse::<u8>()
                .map_err(|_| AppError::NotAllowed("age must be a number".to_string()))?;
            let kid = app.add_kid(&rest(args, 1), age, "owl")?;
            println!("added {} ({})", kid.name, kid.id);
        }
        "kid" => {
            app.select_kid(arg(args, 0)?)?;
        }
        "pin" => app.set_parental_pin(arg(args, 0)?, arg(args, 1)?)?,
        "exit" => {
            app.exit_kid_mode(args.first().copied())?;
        }
        "teachers" => {
            for t in app.teachers() {
                println!("{:<28} {:<20} {:?}", t.id, t.name, t.verification_status);
            }
        }
        "courses" => {
            for c in app.courses() {
                println!("{:<28} {:<28} {:?}", c.id, c.title, c.status);
            }
        }
        "activities" => {
            for a in app.activities() {
                println!("{:<28} {:<28} {:?}", a.id, a.title, a.status);
            }
        }
        "mine" => {
            for a in app.kid_activities() {
                println!("{:<28} {:<28} {} pts", a.id, a.title, a.points);
            }
        }
        "complete" => {
            let kid = app.complete_activity(arg(args, 0)?)?;
            println!("{} now has {} points", kid.name, kid.points);
        }
        "progress" => match app.kid_progress(arg(args, 0)?) {
            Some(progress) => println!("{:?}", progress),
            None => println!("no such kid"),
        },
        "verify" => {
            let teacher = app.update_teacher_verification(arg(args, 0)?, arg(args, 1)?).await?;
            println!("{} is {:?}", teacher.id, teacher.verification_status);
        }
        "course" => {
            let course = app.update_course_status(arg(args, 0)?, arg(args, 1)?).await?;
            println!("{} is {:?}", course.id, course.status);
        }
        "activity" => {
            let activity = app.update_activity_status(arg(args, 0)?, arg(args, 1)?).await?;
            println!("{} is {:?}", activity.id, activity.status);
        }
        "chat" => {
            let id = app.chat_with(arg(args, 0)?)?;
            println!("conversation {}", id);
            for message in app.messages_for(&id) {
                println!("  {}: {}", message.sender_id, message.text);
            }
        }
        "say" => {
            let text = rest(args, 1);
            app.send_message(arg(args, 0)?, &text)?;
        }
        other => println!("unknown command '{}', try help", other),
    }
    Ok(())
}
