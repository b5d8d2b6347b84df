//! Line-oriented menu loop over any input and output stream.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use flash_core::challenge::ChallengeUpdate;
use flash_core::grader::Tier;
use flash_core::model::UserDirectory;
use services::account_service::RESERVED_USERNAME;
use services::{AppServices, ChallengeService};
use storage::transfer::SetFormat;

/// Typed at any in-session prompt to leave the session early.
const EXIT: &str = "exit";

const MENU: &[&str] = &[
    "Practice a set",
    "Revision mode",
    "Quiz mode",
    "Fill in the blank",
    "Create a set",
    "Add a term",
    "Edit a definition",
    "Delete a term",
    "Delete a set",
    "List sets",
    "Browse by category",
    "Search a set",
    "View progress",
    "Daily challenge",
    "Leaderboard",
    "Account details",
    "Export a set",
    "Import a set",
    "Account settings",
    "Log out",
];

enum MenuOutcome {
    Stay,
    LoggedOut,
}

pub struct Shell<R, W> {
    app: AppServices,
    directory: UserDirectory,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(app: AppServices, directory: UserDirectory, input: R, output: W) -> Self {
        Self {
            app,
            directory,
            input,
            output,
        }
    }

    /// Hand the streams back, mostly for tests.
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Welcome loop: sign up or log in until `quit` or end of input.
    pub async fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "Welcome to Flashcards!")?;
        loop {
            let prompt = format!("Username ('{RESERVED_USERNAME}' to sign up, 'quit' to leave): ");
            let Some(username) = self.prompt(&prompt)? else {
                break;
            };
            if username.is_empty() {
                continue;
            }
            if username.eq_ignore_ascii_case("quit") {
                break;
            }

            let logged_in = if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
                self.signup().await?
            } else {
                self.login(&username).await?
            };
            if let Some(user) = logged_in {
                self.user_menu(user).await?;
            }
        }
        writeln!(self.output, "Goodbye!")?;
        Ok(())
    }

    async fn signup(&mut self) -> io::Result<Option<String>> {
        let Some(username) = self.prompt("Choose a username: ")? else {
            return Ok(None);
        };
        let Some(password) = self.prompt("Choose a password: ")? else {
            return Ok(None);
        };
        match self
            .app
            .accounts()
            .signup(&mut self.directory, &username, &password)
            .await
        {
            Ok(()) => {
                writeln!(self.output, "Account created. Welcome, {username}!")?;
                Ok(Some(username))
            }
            Err(err) => {
                writeln!(self.output, "Could not sign up: {err}")?;
                Ok(None)
            }
        }
    }

    async fn login(&mut self, username: &str) -> io::Result<Option<String>> {
        let Some(password) = self.prompt("Password: ")? else {
            return Ok(None);
        };
        match self
            .app
            .accounts()
            .login(&mut self.directory, username, &password)
            .await
        {
            Ok(()) => {
                writeln!(self.output, "Welcome back, {username}!")?;
                Ok(Some(username.to_owned()))
            }
            Err(err) => {
                writeln!(self.output, "Login failed: {err}")?;
                Ok(None)
            }
        }
    }

    async fn user_menu(&mut self, mut user: String) -> io::Result<()> {
        let mut challenge = self.app.challenge();
        loop {
            writeln!(self.output)?;
            for (idx, label) in MENU.iter().enumerate() {
                writeln!(self.output, "{:>2}. {label}", idx + 1)?;
            }
            let Some(choice) = self.prompt("Choose an option: ")? else {
                return Ok(());
            };

            let outcome = match choice.as_str() {
                "1" => self.practice(&user, &mut challenge).await?,
                "2" => self.revision(&user)?,
                "3" => self.quiz(&user)?,
                "4" => self.fill_blank(&user)?,
                "5" => self.create_set(&user).await?,
                "6" => self.add_term(&user).await?,
                "7" => self.edit_definition(&user).await?,
                "8" => self.delete_term(&user).await?,
                "9" => self.delete_set(&user).await?,
                "10" => self.list_sets(&user)?,
                "11" => self.browse_category(&user)?,
                "12" => self.search(&user)?,
                "13" => self.progress(&user)?,
                "14" => self.show_challenge(&mut challenge)?,
                "15" => self.leaderboard()?,
                "16" => self.account_details(&user)?,
                "17" => self.export_set(&user)?,
                "18" => self.import_set(&user).await?,
                "19" => self.account_settings(&mut user).await?,
                "20" => MenuOutcome::LoggedOut,
                other => {
                    writeln!(self.output, "Unknown option: {other}")?;
                    MenuOutcome::Stay
                }
            };
            if matches!(outcome, MenuOutcome::LoggedOut) {
                writeln!(self.output, "Logged out.")?;
                return Ok(());
            }
        }
    }

    //
    // ─── STUDY MODES ───────────────────────────────────────────────────────────
    //

    async fn practice(
        &mut self,
        user: &str,
        challenge: &mut ChallengeService,
    ) -> io::Result<MenuOutcome> {
        let Some(set_name) = self.choose_set(user)? else {
            return Ok(MenuOutcome::Stay);
        };
        let study = self.app.study();
        let mut session = match study.start_practice(&self.directory, user, &set_name) {
            Ok(session) => session,
            Err(err) => return self.report(err),
        };

        while let Some(term) = session.current_term().map(str::to_owned) {
            writeln!(self.output, "\nTerm: {term}")?;
            let Some(answer) = self.prompt(&format!("Definition ('{EXIT}' to stop): "))? else {
                break;
            };
            if answer.eq_ignore_ascii_case(EXIT) {
                break;
            }
            let graded = match study
                .answer_practice(&mut self.directory, user, &mut session, &answer)
                .await
            {
                Ok(graded) => graded,
                Err(err) => {
                    writeln!(self.output, "Practice stopped: {err}")?;
                    break;
                }
            };
            match graded.grade.tier {
                Tier::Correct => writeln!(self.output, "Correct!")?,
                Tier::Partial => writeln!(
                    self.output,
                    "Almost. Hint: {}",
                    graded.grade.hint.as_deref().unwrap_or_default()
                )?,
                Tier::Incorrect => {
                    writeln!(self.output, "Incorrect. Answer: {}", graded.definition)?;
                }
            }
        }

        let summary = session.summary();
        writeln!(
            self.output,
            "Score: {}/{} ({} of {} terms asked)",
            summary.score, summary.answered, summary.answered, summary.total
        )?;
        let update = challenge.record_correct_answers(summary.score);
        self.print_challenge_update(update)?;
        Ok(MenuOutcome::Stay)
    }

    fn revision(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let Some(set_name) = self.choose_set(user)? else {
            return Ok(MenuOutcome::Stay);
        };
        let started =
            self.app
                .study()
                .start_revision(&self.directory, user, &set_name, &mut rand::rng());
        let mut session = match started {
            Ok(session) => session,
            Err(err) => return self.report(err),
        };

        while let Some(term) = session.current_term().map(str::to_owned) {
            writeln!(self.output, "\nTerm: {term}")?;
            let Some(input) = self.prompt(&format!("Press Enter to reveal ('{EXIT}' to stop): "))?
            else {
                break;
            };
            if input.eq_ignore_ascii_case(EXIT) {
                break;
            }
            match session.reveal() {
                Ok(card) => writeln!(self.output, "Definition: {}", card.definition)?,
                Err(err) => return self.report(err),
            }
        }
        let progress = session.progress();
        writeln!(
            self.output,
            "Reviewed {} of {} cards.",
            progress.answered, progress.total
        )?;
        Ok(MenuOutcome::Stay)
    }

    fn quiz(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let Some(set_name) = self.choose_set(user)? else {
            return Ok(MenuOutcome::Stay);
        };
        let started = self
            .app
            .study()
            .start_quiz(&self.directory, user, &set_name, &mut rand::rng());
        let mut session = match started {
            Ok(session) => session,
            Err(err) => return self.report(err),
        };

        'questions: while let Some(question) = session.current().cloned() {
            writeln!(self.output, "\nTerm: {}", question.term)?;
            for (idx, option) in question.options.iter().enumerate() {
                writeln!(self.output, "  {}. {option}", idx + 1)?;
            }
            loop {
                let Some(input) = self.prompt(&format!("Your choice ('{EXIT}' to stop): "))?
                else {
                    break 'questions;
                };
                if input.eq_ignore_ascii_case(EXIT) {
                    break 'questions;
                }
                let Ok(choice) = input.parse::<usize>() else {
                    writeln!(self.output, "Please enter an option number.")?;
                    continue;
                };
                match session.answer_current(choice) {
                    Ok(answer) if answer.correct => {
                        writeln!(self.output, "Correct!")?;
                        break;
                    }
                    Ok(answer) => {
                        writeln!(self.output, "Incorrect. Answer: {}", answer.expected)?;
                        break;
                    }
                    Err(err) => writeln!(self.output, "{err}")?,
                }
            }
        }

        let summary = session.summary();
        writeln!(
            self.output,
            "Quiz score: {}/{}",
            summary.score, summary.answered
        )?;
        Ok(MenuOutcome::Stay)
    }

    fn fill_blank(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let Some(set_name) = self.choose_set(user)? else {
            return Ok(MenuOutcome::Stay);
        };
        let started =
            self.app
                .study()
                .start_fill_blank(&self.directory, user, &set_name, &mut rand::rng());
        let mut session = match started {
            Ok(session) => session,
            Err(err) => return self.report(err),
        };
        if session.skipped() > 0 {
            writeln!(
                self.output,
                "Skipping {} term(s) with definitions too short to blank.",
                session.skipped()
            )?;
        }

        while let Some(prompt) = session.current().cloned() {
            writeln!(self.output, "\nTerm: {}", prompt.term)?;
            writeln!(self.output, "Definition: {}", prompt.masked)?;
            let Some(guess) = self.prompt(&format!("Missing word ('{EXIT}' to stop): "))? else {
                break;
            };
            if guess.eq_ignore_ascii_case(EXIT) {
                break;
            }
            match session.answer_current(&guess) {
                Ok(answer) if answer.correct => writeln!(self.output, "Correct!")?,
                Ok(answer) => writeln!(self.output, "Incorrect. The word was: {}", answer.expected)?,
                Err(err) => return self.report(err),
            }
        }

        let summary = session.summary();
        writeln!(
            self.output,
            "Fill-in-the-blank score: {}/{}",
            summary.score, summary.answered
        )?;
        Ok(MenuOutcome::Stay)
    }

    //
    // ─── SET MANAGEMENT ────────────────────────────────────────────────────────
    //

    async fn create_set(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let Some(name) = self.prompt("Set name: ")? else {
            return Ok(MenuOutcome::Stay);
        };
        let Some(category) = self.prompt("Category (blank for Uncategorized): ")? else {
            return Ok(MenuOutcome::Stay);
        };
        let category = (!category.is_empty()).then_some(category);
        match self
            .app
            .sets()
            .create_set(&mut self.directory, user, &name, category)
            .await
        {
            Ok(()) => writeln!(self.output, "Created set '{name}'.")?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(MenuOutcome::Stay)
    }

    async fn add_term(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let Some(set_name) = self.choose_set(user)? else {
            return Ok(MenuOutcome::Stay);
        };
        let Some(term) = self.prompt("Term: ")? else {
            return Ok(MenuOutcome::Stay);
        };
        let Some(definition) = self.prompt("Definition: ")? else {
            return Ok(MenuOutcome::Stay);
        };
        match self
            .app
            .sets()
            .add_term(&mut self.directory, user, &set_name, &term, &definition)
            .await
        {
            Ok(()) => writeln!(self.output, "Added '{term}' to '{set_name}'.")?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(MenuOutcome::Stay)
    }

    async fn edit_definition(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let Some(set_name) = self.choose_set(user)? else {
            return Ok(MenuOutcome::Stay);
        };
        let Some(term) = self.prompt("Term to edit: ")? else {
            return Ok(MenuOutcome::Stay);
        };
        let Some(definition) = self.prompt("New definition: ")? else {
            return Ok(MenuOutcome::Stay);
        };
        match self
            .app
            .sets()
            .edit_definition(&mut self.directory, user, &set_name, &term, &definition)
            .await
        {
            Ok(()) => writeln!(self.output, "Updated '{term}'.")?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(MenuOutcome::Stay)
    }

    async fn delete_term(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let Some(set_name) = self.choose_set(user)? else {
            return Ok(MenuOutcome::Stay);
        };
        let Some(term) = self.prompt("Term to delete: ")? else {
            return Ok(MenuOutcome::Stay);
        };
        match self
            .app
            .sets()
            .delete_term(&mut self.directory, user, &set_name, &term)
            .await
        {
            Ok(()) => writeln!(self.output, "Deleted '{term}'.")?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(MenuOutcome::Stay)
    }

    async fn delete_set(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let Some(set_name) = self.choose_set(user)? else {
            return Ok(MenuOutcome::Stay);
        };
        match self
            .app
            .sets()
            .delete_set(&mut self.directory, user, &set_name)
            .await
        {
            Ok(()) => writeln!(self.output, "Deleted set '{set_name}'.")?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(MenuOutcome::Stay)
    }

    fn list_sets(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let overview = match self.app.sets().overview(&self.directory, user) {
            Ok(overview) => overview,
            Err(err) => return self.report(err),
        };
        if overview.is_empty() {
            writeln!(self.output, "No sets yet.")?;
        }
        for set in overview {
            writeln!(
                self.output,
                "{} [{}]: {} term(s), {}/{} correct ({:.1}%)",
                set.name,
                set.category,
                set.term_count,
                set.stats.correct,
                set.stats.total,
                set.stats.percentage
            )?;
        }
        Ok(MenuOutcome::Stay)
    }

    fn browse_category(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let sets = self.app.sets();
        let categories = match sets.categories(&self.directory, user) {
            Ok(categories) => categories,
            Err(err) => return self.report(err),
        };
        writeln!(self.output, "Categories: {}", categories.join(", "))?;
        let Some(category) = self.prompt("Category: ")? else {
            return Ok(MenuOutcome::Stay);
        };
        match sets.sets_in_category(&self.directory, user, &category) {
            Ok(found) if found.is_empty() => {
                writeln!(self.output, "No sets in '{category}'.")?;
            }
            Ok(found) => {
                for set in found {
                    writeln!(self.output, "- {} ({} term(s))", set.name, set.term_count)?;
                }
            }
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(MenuOutcome::Stay)
    }

    fn search(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let Some(set_name) = self.choose_set(user)? else {
            return Ok(MenuOutcome::Stay);
        };
        let Some(query) = self.prompt("Search for: ")? else {
            return Ok(MenuOutcome::Stay);
        };
        match self
            .app
            .sets()
            .search(&self.directory, user, &set_name, &query)
        {
            Ok(hits) if hits.is_empty() => writeln!(self.output, "No matches.")?,
            Ok(hits) => {
                for hit in hits {
                    writeln!(self.output, "{}: {}", hit.term, hit.definition)?;
                }
            }
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(MenuOutcome::Stay)
    }

    fn progress(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let reports = match self.app.sets().progress_all(&self.directory, user) {
            Ok(reports) => reports,
            Err(err) => return self.report(err),
        };
        for (name, report) in reports {
            writeln!(self.output, "\n{name}")?;
            writeln!(
                self.output,
                "  learned {}/{} terms, {}/{} correct ({:.1}%)",
                report.learned_terms,
                report.total_terms,
                report.correct_answers,
                report.total_attempts,
                report.accuracy
            )?;
            for weak in report.needs_practice {
                writeln!(
                    self.output,
                    "  needs practice: {} ({}/{})",
                    weak.term, weak.correct, weak.total
                )?;
            }
        }
        Ok(MenuOutcome::Stay)
    }

    fn export_set(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let Some(set_name) = self.choose_set(user)? else {
            return Ok(MenuOutcome::Stay);
        };
        let Some(raw_format) = self.prompt("Format (json/csv): ")? else {
            return Ok(MenuOutcome::Stay);
        };
        let format = match raw_format.parse::<SetFormat>() {
            Ok(format) => format,
            Err(err) => return self.report(err),
        };
        let Some(dir) = self.prompt("Directory (blank for current): ")? else {
            return Ok(MenuOutcome::Stay);
        };
        let out_dir = if dir.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(dir)
        };
        match self
            .app
            .sets()
            .export_set(&self.directory, user, &set_name, format, &out_dir)
        {
            Ok(path) => writeln!(self.output, "Exported to {}", path.display())?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(MenuOutcome::Stay)
    }

    async fn import_set(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let Some(path) = self.prompt("File to import (.json or .csv): ")? else {
            return Ok(MenuOutcome::Stay);
        };
        let Some(set_name) = self.prompt("Name for the new set: ")? else {
            return Ok(MenuOutcome::Stay);
        };
        match self
            .app
            .sets()
            .import_set(&mut self.directory, user, &set_name, Path::new(&path))
            .await
        {
            Ok(count) => writeln!(self.output, "Imported {count} term(s) into '{set_name}'.")?,
            Err(err) => writeln!(self.output, "Import failed: {err}")?,
        }
        Ok(MenuOutcome::Stay)
    }

    //
    // ─── ACCOUNT ───────────────────────────────────────────────────────────────
    //

    fn show_challenge(&mut self, challenge: &mut ChallengeService) -> io::Result<MenuOutcome> {
        let today = challenge.today();
        let line = if today.is_completed() {
            format!("Daily challenge for {}: completed!", today.date())
        } else {
            format!(
                "Daily challenge for {}: {}/{} correct answers",
                today.date(),
                today.progress(),
                today.goal()
            )
        };
        writeln!(self.output, "{line}")?;
        Ok(MenuOutcome::Stay)
    }

    fn print_challenge_update(&mut self, update: ChallengeUpdate) -> io::Result<()> {
        match update {
            ChallengeUpdate::Progressed { progress, goal } => {
                writeln!(self.output, "Daily challenge: {progress}/{goal}")
            }
            ChallengeUpdate::JustCompleted { progress } => writeln!(
                self.output,
                "Daily challenge completed with {progress} correct answers!"
            ),
            ChallengeUpdate::AlreadyCompleted => Ok(()),
        }
    }

    fn leaderboard(&mut self) -> io::Result<MenuOutcome> {
        let entries = self.app.leaderboard(&self.directory);
        writeln!(self.output, "Leaderboard:")?;
        for (idx, entry) in entries.iter().enumerate() {
            writeln!(
                self.output,
                "{:>3}. {} ({}, {} correct)",
                idx + 1,
                entry.username,
                entry.level,
                entry.total_correct
            )?;
        }
        Ok(MenuOutcome::Stay)
    }

    fn account_details(&mut self, user: &str) -> io::Result<MenuOutcome> {
        let details = match self.app.accounts().details(&self.directory, user) {
            Ok(details) => details,
            Err(err) => return self.report(err),
        };
        writeln!(self.output, "Username: {}", details.username)?;
        writeln!(self.output, "Level: {}", details.level)?;
        writeln!(self.output, "Sets ({}):", details.set_count())?;
        for name in &details.set_names {
            writeln!(self.output, "- {name}")?;
        }
        if details.achievements.is_empty() {
            writeln!(self.output, "No achievements yet.")?;
        } else {
            writeln!(self.output, "Achievements:")?;
            for achievement in &details.achievements {
                writeln!(self.output, "* {achievement}")?;
            }
        }
        Ok(MenuOutcome::Stay)
    }

    async fn account_settings(&mut self, user: &mut String) -> io::Result<MenuOutcome> {
        writeln!(self.output, "1. Change username")?;
        writeln!(self.output, "2. Change password")?;
        writeln!(self.output, "3. Delete account")?;
        writeln!(self.output, "4. Back")?;
        let Some(choice) = self.prompt("Choose an option: ")? else {
            return Ok(MenuOutcome::Stay);
        };
        let accounts = self.app.accounts();
        match choice.as_str() {
            "1" => {
                let Some(new_name) = self.prompt("New username: ")? else {
                    return Ok(MenuOutcome::Stay);
                };
                match accounts.rename(&mut self.directory, user.as_str(), &new_name).await {
                    Ok(()) => {
                        writeln!(self.output, "Username changed to {new_name}.")?;
                        *user = new_name;
                    }
                    Err(err) => writeln!(self.output, "{err}")?,
                }
            }
            "2" => {
                let Some(password) = self.prompt("New password: ")? else {
                    return Ok(MenuOutcome::Stay);
                };
                match accounts
                    .change_password(&mut self.directory, user.as_str(), &password)
                    .await
                {
                    Ok(()) => writeln!(self.output, "Password changed.")?,
                    Err(err) => writeln!(self.output, "{err}")?,
                }
            }
            "3" => {
                let Some(confirmation) =
                    self.prompt(&format!("Type '{user}' to delete your account: "))?
                else {
                    return Ok(MenuOutcome::Stay);
                };
                match accounts
                    .delete(&mut self.directory, user.as_str(), &confirmation)
                    .await
                {
                    Ok(()) => {
                        writeln!(self.output, "Account deleted.")?;
                        return Ok(MenuOutcome::LoggedOut);
                    }
                    Err(err) => writeln!(self.output, "{err}")?,
                }
            }
            _ => {}
        }
        Ok(MenuOutcome::Stay)
    }

    //
    // ─── INPUT ─────────────────────────────────────────────────────────────────
    //

    /// Pick a set by number or name; `None` when nothing valid was chosen.
    fn choose_set(&mut self, user: &str) -> io::Result<Option<String>> {
        let names: Vec<String> = match self.directory.user(user) {
            Ok(account) => account.sets().keys().cloned().collect(),
            Err(err) => {
                writeln!(self.output, "{err}")?;
                return Ok(None);
            }
        };
        if names.is_empty() {
            writeln!(self.output, "No sets yet.")?;
            return Ok(None);
        }
        for (idx, name) in names.iter().enumerate() {
            writeln!(self.output, "{:>2}. {name}", idx + 1)?;
        }
        let Some(choice) = self.prompt("Set (number or name): ")? else {
            return Ok(None);
        };
        let picked = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|idx| names.get(idx).cloned())
            .or_else(|| names.iter().find(|name| **name == choice).cloned());
        if picked.is_none() {
            writeln!(self.output, "No set named '{choice}'.")?;
        }
        Ok(picked)
    }

    /// Print `label` and read one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    fn report(&mut self, err: impl std::fmt::Display) -> io::Result<MenuOutcome> {
        writeln!(self.output, "{err}")?;
        Ok(MenuOutcome::Stay)
    }
}
