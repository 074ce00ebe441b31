//! Command handlers
//!
//! Each handler drives the library the way a screen would: forms through
//! [`FormState`](crate::forms::FormState), lists through
//! [`filter`](crate::filter::filter), the sleep log through a
//! [`RemoteResource`](crate::api::RemoteResource).

use tracing::{debug, warn};

use super::output::Output;
use super::{EntryArgs, FilterArgs, SleepCommands};
use crate::chat::{self, ChatHistory, ChatRole, HistoryStore};
use crate::content::{self, CATEGORIES, FORMATS};
use crate::filter::{filter, FilterCriteria};
use crate::forms::auth::{
    apply_login_error, apply_signup_error, classify_login_error, login_form, login_request,
    signup_form, signup_request,
};
use crate::forms::FormState;
use crate::sleep::{self, NewSleepEntry, SleepPatch};
use crate::types::{AppError, Result};
use crate::utils::toml_config::NeonestConfig;
use crate::utils::Session;
use crate::AppState;

/// Print `form`'s visible errors.
fn report_form(form: &FormState, output: &Output) {
    for (field, message) in form.visible_errors() {
        output.field_error(field, message);
    }
}

/// Fill a form from flag values, touching each field as a blur would.
fn fill(form: &mut FormState, fields: &[(&str, &str)]) -> Result<()> {
    for (name, value) in fields {
        form.set_value(name, *value)?;
        form.set_touched(name)?;
    }
    Ok(())
}

pub fn config(config: &NeonestConfig, full: bool, validate: bool, output: &Output) -> Result<()> {
    config
        .validate()
        .map_err(|e| AppError::Config(e.to_string()))?;
    output.success("Configuration is valid");
    if validate {
        return Ok(());
    }

    if full {
        let text = config.to_toml().map_err(|e| AppError::Config(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    output.header("Configuration");
    output.kv("api.base_url", &config.api.base_url);
    output.kv("api.timeout_secs", &config.api.timeout_secs.to_string());
    output.kv("api.token_env", &config.api.token_env);
    output.kv("i18n.locale", &config.i18n.locale);
    output.kv("i18n.locales_dir", &config.i18n.locales_dir.display().to_string());
    output.kv("logging.level", &config.logging.level);
    output.kv("session.file", &config.session.file.display().to_string());
    output.kv("session.chat_file", &config.session.chat_file.display().to_string());
    Ok(())
}

pub async fn login(state: &AppState, email: &str, password: &str, output: &Output) -> Result<()> {
    let t = &state.translator;
    let mut form = login_form(t);
    fill(&mut form, &[("email", email), ("password", password)])?;

    let request = match form.submit(login_request) {
        Ok(request) => request,
        Err(e) => {
            report_form(&form, output);
            return Err(AppError::InvalidInput(classify_login_error(t, &e).message));
        }
    };

    match state.client.login(&request).await {
        Ok(token) => {
            Session::new(token, &request.email).save(&state.session_file)?;
            output.success(&t.t("login.success", &[]));
            Ok(())
        }
        Err(e) => {
            let failure = classify_login_error(t, &e);
            let message = apply_login_error(&mut form, t, &e);
            report_form(&form, output);
            if failure.suggest_signup {
                output.command(&format!("neonest signup -n <name> -e {}", request.email));
            }
            Err(e.with_message(message))
        }
    }
}

pub async fn signup(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
    output: &Output,
) -> Result<()> {
    let t = &state.translator;
    let mut form = signup_form(t);
    fill(&mut form, &[("name", name), ("email", email), ("password", password)])?;

    let request = match form.submit(signup_request) {
        Ok(request) => request,
        Err(e) => {
            report_form(&form, output);
            return Err(AppError::InvalidInput(apply_signup_error(&mut form, t, &e)));
        }
    };

    match state.client.signup(&request).await {
        Ok(response) => {
            if let Some(token) = response.token {
                Session::new(token, &request.email).save(&state.session_file)?;
            }
            output.success(&t.t("signup.success", &[]));
            Ok(())
        }
        Err(e) => {
            let message = apply_signup_error(&mut form, t, &e);
            report_form(&form, output);
            Err(e.with_message(message))
        }
    }
}

pub fn logout(state: &AppState, output: &Output) -> Result<()> {
    Session::clear(&state.session_file)?;
    state.chat_log.clear()?;
    output.success("Logged out");
    Ok(())
}

pub async fn sleep(state: &AppState, command: SleepCommands, output: &Output) -> Result<()> {
    let t = &state.translator;
    if !state.client.is_authenticated() {
        output.hint("Not logged in; the backend will likely refuse this request");
    }

    let log = state.sleep_log();
    let today = sleep::today();

    match command {
        SleepCommands::List { search, kind, mood } => {
            let entries = log.list().await?;
            let criteria = FilterCriteria::new().search(search).kind(kind).category(mood);
            let shown = filter(&entries, &criteria);

            output.header(&t.t("sleep.title", &[]));
            if shown.is_empty() {
                output.info(&t.t("sleep.noEntries", &[]));
            }
            for entry in &shown {
                output.sleep_entry(entry, true);
            }
            let count = shown.len().to_string();
            output.info(&t.t("sleep.entriesCount", &[("count", count.as_str())]));
        }
        SleepCommands::Today => {
            let entries = log.list().await?;

            output.header(&t.t("sleep.today", &[]));
            let todays = sleep::todays_entries(&entries, today);
            if todays.is_empty() {
                output.info(&t.t("sleep.noEntries", &[]));
            }
            for entry in todays {
                output.sleep_entry(entry, false);
            }

            output.header(&t.t("sleep.previous", &[]));
            for entry in sleep::previous_entries(&entries, today) {
                output.sleep_entry(entry, true);
            }
        }
        SleepCommands::Add { entry } => {
            let mut form = sleep::sleep_form();
            fill(&mut form, &entry.fields())?;
            let draft = match form.submit(|values| NewSleepEntry::from_values(&values, today)) {
                Ok(draft) => draft?,
                Err(e) => {
                    report_form(&form, output);
                    return Err(e);
                }
            };

            let created = log.create(&draft).await?;
            output.success(&t.t("sleep.added", &[]));
            output.sleep_entry(&created, true);
        }
        SleepCommands::Update { id, entry } => update_entry(state, &log, &id, &entry, output).await?,
        SleepCommands::Delete { id } => {
            log.remove(&id).await?;
            output.success(&t.t("sleep.deleted", &[]));
        }
    }

    Ok(())
}

async fn update_entry(
    state: &AppState,
    log: &crate::api::RemoteResource<sleep::SleepEntry>,
    id: &str,
    entry: &EntryArgs,
    output: &Output,
) -> Result<()> {
    let id = id.to_string();
    log.list().await?;
    let current = log
        .get(&id)
        .ok_or_else(|| AppError::InvalidInput(format!("No sleep entry with id '{}'", id)))?;

    let mut form = sleep::edit_form(&current);
    fill(&mut form, &entry.fields())?;
    let patch = match form.submit(|values| SleepPatch::from_values(&values)) {
        Ok(patch) => patch?,
        Err(e) => {
            report_form(&form, output);
            return Err(e);
        }
    };

    debug!(%id, "Updating sleep entry");
    let updated = log.update(&id, &patch).await?;
    output.success(&state.translator.t("sleep.updated", &[]));
    output.sleep_entry(&updated, true);
    Ok(())
}

pub fn resources(state: &AppState, args: &FilterArgs, kind: &str, output: &Output) -> Result<()> {
    let t = &state.translator;
    let criteria = FilterCriteria::new()
        .search(args.search.as_str())
        .category(args.category.as_str())
        .kind(kind);
    check_choice("category", criteria.category.as_str(), CATEGORIES)?;
    check_choice("type", criteria.kind.as_str(), FORMATS)?;

    let articles = content::articles(t)?;
    let shown = filter(&articles, &criteria);

    output.header(&t.t("resources.title", &[]));
    if criteria.filters_applied() {
        let category = t.t(&format!("resources.categories.{}", criteria.category), &[]);
        let kind = t.t(&format!("resources.types.{}", criteria.kind), &[]);
        output.kv("filters", &format!("{} / {}", category, kind));
    }
    if shown.is_empty() {
        output.info(&t.t("resources.noResults", &[]));
        return Ok(());
    }
    for article in &shown {
        output.article(article);
    }
    let count = shown.len().to_string();
    output.info(&t.t("resources.resultsCount", &[("count", count.as_str())]));
    Ok(())
}

pub fn faq(state: &AppState, args: &FilterArgs, output: &Output) -> Result<()> {
    let t = &state.translator;
    let criteria = FilterCriteria::new()
        .search(args.search.as_str())
        .category(args.category.as_str());
    check_choice("category", criteria.category.as_str(), CATEGORIES)?;

    let questions = content::faq_questions(t)?;
    let sections = content::filter_faqs(t, &questions, &criteria);

    output.header(&t.t("faq.title", &[]));
    if sections.is_empty() {
        output.info(&t.t("faq.noResults", &[]));
    }
    for section in &sections {
        output.faq_section(section);
    }
    Ok(())
}

pub async fn chat(
    state: &AppState,
    message: &str,
    role: &str,
    quick: bool,
    fresh: bool,
    output: &Output,
) -> Result<()> {
    let t = &state.translator;
    let role: ChatRole = role.parse()?;
    let text = if quick {
        if !chat::QUICK_QUESTIONS.contains(&message) {
            return Err(AppError::InvalidInput(format!(
                "Unknown quick question '{}' (choose from: {})",
                message,
                chat::QUICK_QUESTIONS.join(", ")
            )));
        }
        chat::quick_question(t, message)
    } else {
        message.to_string()
    };

    output.info(&chat::role_switched_notice(t, role));
    let history = if fresh {
        ChatHistory::new().with_messages(role, Vec::new())
    } else {
        chat::load_history(&state.chat_log, &ChatHistory::new(), role).await
    };
    let turn = chat::send(&state.client, t, &history, role, &text).await;
    for message in turn.history.messages(role) {
        output.chat_message(message);
    }

    match turn.error {
        Some(e) => Err(e),
        None => {
            if let Err(e) = state.chat_log.save(role, turn.history.messages(role)).await {
                warn!(%role, "Chat reply not stored: {}", e);
            }
            Ok(())
        }
    }
}

fn check_choice(what: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if value == crate::filter::Selection::ALL || allowed.contains(&value) {
        return Ok(());
    }
    Err(AppError::InvalidInput(format!(
        "Unknown {} '{}' (choose from: all, {})",
        what,
        value,
        allowed.join(", ")
    )))
}
