//! LMNOP CLI
//!
//! Terminal front-end for the LMNOP learning-management system: sign in,
//! browse and manage courses, request and review enrollments, administer
//! accounts, take quizzes and contact support.

mod views;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use lmnop_client::quiz::{self, QuizSheet};
use lmnop_client::{
    Account, AccountFamily, AccessGuard, Config, CourseForm, Credentials, EnrollmentStatus,
    FileStorage, ImageUpload, LmsContext, LmsError, Location, Navigation, Page, Role,
    SessionStore, SupportMessage,
};
use tracing_subscriber::EnvFilter;

/// LMNOP - learning-management client
///
/// Talks to the LMNOP REST backend. The session is kept in a local file so
/// that one login serves many invocations.
#[derive(Parser, Debug)]
#[command(name = "lmnop")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: lmnop.json in current directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Backend base address, overriding the configuration file
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and remember the session
    Login {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long)]
        password: String,
        /// Log in through the administrator portal
        #[arg(long)]
        admin: bool,
    },
    /// Create an account
    Register {
        #[command(flatten)]
        account: AccountArgs,
        /// Create an administrator account
        #[arg(long)]
        admin: bool,
    },
    /// Forget the stored session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Show the dashboard for your role
    Dashboard,
    /// Browse and manage courses
    #[command(subcommand)]
    Courses(CourseCommand),
    /// Request enrollment in a course
    Enroll {
        /// Exact course title
        course: String,
    },
    /// Review enrollment requests
    #[command(subcommand)]
    Enrollments(EnrollmentCommand),
    /// Administer student and admin accounts
    #[command(subcommand)]
    Users(UserCommand),
    /// Take quizzes
    #[command(subcommand)]
    Quizzes(QuizCommand),
    /// Contact support or read support messages
    #[command(subcommand)]
    Support(SupportCommand),
}

#[derive(clap::Args, Debug)]
struct AccountArgs {
    /// Given name
    #[arg(long)]
    first_name: String,
    /// Family name
    #[arg(long)]
    last_name: String,
    /// Login email
    #[arg(long)]
    email: String,
    /// Password (at least 6 characters)
    #[arg(long)]
    password: String,
}

impl AccountArgs {
    fn into_account(self) -> Account {
        Account {
            id: None,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: Some(self.password),
        }
    }
}

#[derive(Subcommand, Debug)]
enum CourseCommand {
    /// List all courses
    List,
    /// Show one course
    Show { id: u64 },
    /// Create a course (admin)
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// PNG or JPEG image
        #[arg(long, value_name = "FILE")]
        image: PathBuf,
    },
    /// Update a course (admin); omitted fields keep their value
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Replacement PNG or JPEG image
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
    },
    /// Delete a course (admin)
    Delete { id: u64 },
    /// Print the address of a course's image
    ImageUrl { id: u64 },
}

#[derive(Subcommand, Debug)]
enum EnrollmentCommand {
    /// List enrollments, optionally filtered
    List {
        /// Only this status (pending, approved, rejected)
        #[arg(long, conflicts_with_all = ["student", "course"])]
        status: Option<EnrollmentStatus>,
        /// Only this student's enrollments
        #[arg(long, value_name = "ID", conflicts_with = "course")]
        student: Option<u64>,
        /// Only enrollments in this course
        #[arg(long, value_name = "ID")]
        course: Option<u64>,
    },
    /// Show one enrollment
    Show { id: u64 },
    /// Approve a request
    Approve { id: u64 },
    /// Reject a request
    Reject { id: u64 },
    /// Put a request back to pending
    Reset { id: u64 },
    /// Set any status
    SetStatus { id: u64, status: EnrollmentStatus },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// List students and administrators
    List,
    /// Create an account
    Create {
        #[command(flatten)]
        account: AccountArgs,
        /// Create an administrator
        #[arg(long)]
        admin: bool,
    },
    /// Update an account; omitted fields keep their value
    Update {
        id: u64,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// The account is an administrator
        #[arg(long)]
        admin: bool,
    },
    /// Delete an account
    Delete {
        id: u64,
        /// The account is an administrator
        #[arg(long)]
        admin: bool,
    },
}

#[derive(Subcommand, Debug)]
enum QuizCommand {
    /// List the quiz catalogue
    List,
    /// Grade answers against a quiz sheet
    Grade {
        /// Quiz sheet (JSON)
        sheet: PathBuf,
        /// Answers keyed by question text (JSON)
        answers: PathBuf,
    },
    /// List quizzes stored on the backend
    Stored,
}

#[derive(Subcommand, Debug)]
enum SupportCommand {
    /// Send a message to support
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// List received messages (admin)
    List,
    /// Show one message (admin)
    Show { id: u64 },
    /// Replace a message's text (admin)
    Update {
        id: u64,
        #[arg(long)]
        message: String,
    },
}

impl Command {
    /// Page the command renders, or `None` for commands open to everyone.
    fn page(&self, role: Option<Role>) -> Option<Page> {
        let page = match self {
            Self::Logout | Self::Whoami => return None,
            Self::Login { .. } => Page::Login,
            Self::Register { admin: false, .. } => Page::Register,
            Self::Register { admin: true, .. } => Page::AdminRegister,
            Self::Dashboard => role.map_or(Page::StudentDashboard, AccessGuard::dashboard_for),
            Self::Courses(CourseCommand::Update { id, .. }) => Page::CourseUpdate(*id),
            Self::Courses(CourseCommand::Create { .. } | CourseCommand::Delete { .. })
            | Self::Enrollments(_) => Page::AdminDashboard,
            Self::Courses(_) => Page::Courses,
            Self::Enroll { .. } => Page::Enroll,
            Self::Users(_) => Page::UserManagement,
            Self::Quizzes(_) => Page::Quizzes,
            Self::Support(SupportCommand::Contact { .. }) => Page::Support,
            Self::Support(_) => Page::SupportInbox,
        };
        Some(page)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = ?args.config, api_url = ?args.api_url, "Starting");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Builds the context, checks page access, then runs the command.
async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(ref url) = args.api_url {
        config.api_base_url.clone_from(url);
    }
    config.validate()?;

    let storage = Arc::new(FileStorage::new(&config.session_file));
    let role = SessionStore::new(storage.clone()).identity().map(|i| i.role);
    let page = args.command.page(role);

    let location = Arc::new(Location::new(
        page.map_or_else(|| config.landing_path.clone(), Page::path),
    ));
    let ctx = LmsContext::init(config, storage, location.clone())?;

    if let Some(page) = page {
        let access = ctx.guard().check(page);
        if let Navigation::Redirect(to) = ctx.guard().enter(page, location.as_ref()) {
            anyhow::bail!(views::access_denied(access, page, &to));
        }
    }

    match args.command {
        Command::Login {
            email,
            password,
            admin,
        } => login(&ctx, &email, &password, admin).await,
        Command::Register { account, admin } => register(&ctx, account, admin).await,
        Command::Logout => {
            ctx.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => {
            match ctx.session().identity() {
                Some(identity) => println!("{}", views::identity(&identity)),
                None => println!("Not logged in."),
            }
            Ok(())
        }
        Command::Dashboard => dashboard(&ctx).await,
        Command::Courses(command) => courses(&ctx, command).await,
        Command::Enroll { course } => enroll(&ctx, &course).await,
        Command::Enrollments(command) => enrollments(&ctx, command).await,
        Command::Users(command) => users(&ctx, command).await,
        Command::Quizzes(command) => quizzes(&ctx, command).await,
        Command::Support(command) => support(&ctx, command).await,
    }
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Turns a client error into the user-facing message.
fn fail(fallback: &'static str) -> impl Fn(LmsError) -> anyhow::Error {
    move |e| {
        tracing::debug!(error = %e, "Command failed");
        anyhow::anyhow!(views::user_message(&e, fallback))
    }
}

/// Like [`fail`], for commands that run without a session.
fn fail_signed_out(fallback: &'static str) -> impl Fn(LmsError) -> anyhow::Error {
    move |e| {
        tracing::debug!(error = %e, "Command failed");
        anyhow::anyhow!(views::signed_out_message(&e, fallback))
    }
}

// ============================================================================
// Accounts and session
// ============================================================================

async fn login(ctx: &LmsContext, email: &str, password: &str, admin: bool) -> anyhow::Result<()> {
    let family = if admin {
        AccountFamily::Admins
    } else {
        AccountFamily::Customers
    };
    let identity = ctx
        .login(family, &Credentials::new(email, password))
        .await
        .map_err(fail_signed_out("Login failed"))?;

    println!("Welcome, {}!", identity.full_name());
    println!(
        "Logged in as {}. Run `lmnop dashboard` to continue.",
        identity.role
    );
    Ok(())
}

async fn register(ctx: &LmsContext, account: AccountArgs, admin: bool) -> anyhow::Result<()> {
    let account = account.into_account();
    views::validate_account(&account, true).map_err(anyhow::Error::msg)?;

    if admin {
        ctx.admins()
            .register(&account)
            .await
            .map_err(fail_signed_out("Admin registration failed"))?;
        println!("Admin account created successfully! You can now login as admin.");
    } else {
        ctx.customers()
            .register(&account)
            .await
            .map_err(fail_signed_out("Registration failed"))?;
        println!("Registration successful! Please log in.");
    }
    Ok(())
}

async fn users(ctx: &LmsContext, command: UserCommand) -> anyhow::Result<()> {
    let family_of = |admin: bool| {
        if admin {
            AccountFamily::Admins
        } else {
            AccountFamily::Customers
        }
    };

    match command {
        UserCommand::List => {
            let (customers, administrators) = (ctx.customers(), ctx.admins());
            let (students, admins) = tokio::try_join!(customers.all(), administrators.all())
                .map_err(fail("Failed to fetch data"))?;
            println!("Students ({}):", students.len());
            for account in &students {
                println!("{}", views::account_line(account));
            }
            println!();
            println!("Administrators ({}):", admins.len());
            for account in &admins {
                println!("{}", views::account_line(account));
            }
        }
        UserCommand::Create { account, admin } => {
            let account = account.into_account();
            views::validate_account(&account, true).map_err(anyhow::Error::msg)?;
            ctx.accounts(family_of(admin))
                .register(&account)
                .await
                .map_err(fail("Failed to create user"))?;
            println!("{} created successfully!", if admin { "Admin" } else { "User" });
        }
        UserCommand::Update {
            id,
            first_name,
            last_name,
            email,
            password,
            admin,
        } => {
            let accounts = ctx.accounts(family_of(admin));
            let mut account = accounts.read(id).await.map_err(fail("Failed to fetch data"))?;
            account.id = Some(id);
            if let Some(first_name) = first_name {
                account.first_name = first_name;
            }
            if let Some(last_name) = last_name {
                account.last_name = last_name;
            }
            if let Some(email) = email {
                account.email = email;
            }
            account.password = password.filter(|p| !p.is_empty());

            views::validate_account(&account, false).map_err(anyhow::Error::msg)?;
            accounts
                .update(&account)
                .await
                .map_err(fail("Failed to update user"))?;
            println!("{} updated successfully!", if admin { "Admin" } else { "User" });
        }
        UserCommand::Delete { id, admin } => {
            ctx.accounts(family_of(admin))
                .delete(id)
                .await
                .map_err(fail("Failed to delete user"))?;
            println!("{} deleted successfully", if admin { "Admin" } else { "User" });
        }
    }
    Ok(())
}

// ============================================================================
// Dashboards
// ============================================================================

async fn dashboard(ctx: &LmsContext) -> anyhow::Result<()> {
    let Some(identity) = ctx.session().identity() else {
        anyhow::bail!(views::MISSING_IDENTITY);
    };

    let (course_client, enrollment_client) = (ctx.courses(), ctx.enrollments());
    let (courses, enrollments) = tokio::try_join!(course_client.all(), enrollment_client.all())
        .map_err(fail("Failed to load dashboard"))?;

    match identity.role {
        Role::Admin => println!("{}", views::admin_dashboard(&enrollments, &courses)),
        Role::User => {
            let summary = views::StudentSummary::new(&courses, enrollments);
            println!("{}", views::student_dashboard(&identity, &summary));
        }
    }
    Ok(())
}

// ============================================================================
// Courses
// ============================================================================

async fn courses(ctx: &LmsContext, command: CourseCommand) -> anyhow::Result<()> {
    let client = ctx.courses();
    match command {
        CourseCommand::List => {
            let courses = client.all().await.map_err(fail("Failed to fetch courses"))?;
            if courses.is_empty() {
                println!("No courses available.");
            }
            for course in &courses {
                println!("{}", views::course_line(course));
            }
        }
        CourseCommand::Show { id } => {
            let course = client
                .read(id)
                .await
                .map_err(fail("Failed to load course details"))?;
            println!("{}", views::course_detail(&course, &client.image_url(id)));
        }
        CourseCommand::Create {
            title,
            description,
            image,
        } => {
            if title.trim().is_empty() || description.trim().is_empty() {
                anyhow::bail!("Title and description are required");
            }
            let form = CourseForm::create(title, description).with_image(ImageUpload::from_path(&image)?);
            let course = client
                .create(&form)
                .await
                .map_err(fail("Failed to create course"))?;
            println!("Course created successfully! (#{})", course.id);
        }
        CourseCommand::Update {
            id,
            title,
            description,
            image,
        } => {
            let current = client
                .read(id)
                .await
                .map_err(fail("Failed to load course details"))?;
            let title = title.unwrap_or(current.title);
            let description = description.unwrap_or(current.description);
            if title.trim().is_empty() || description.trim().is_empty() {
                anyhow::bail!("Title and description are required");
            }

            let mut form = CourseForm::update(id, title, description);
            if let Some(image) = image {
                form = form.with_image(ImageUpload::from_path(&image)?);
            }
            client
                .update(&form)
                .await
                .map_err(fail("Failed to update course"))?;
            println!("Course updated successfully!");
        }
        CourseCommand::Delete { id } => {
            client
                .delete(id)
                .await
                .map_err(fail("Failed to delete course"))?;
            println!("Course deleted successfully");
        }
        CourseCommand::ImageUrl { id } => println!("{}", client.image_url(id)),
    }
    Ok(())
}

// ============================================================================
// Enrollments
// ============================================================================

async fn enroll(ctx: &LmsContext, course: &str) -> anyhow::Result<()> {
    let identity = ctx
        .session()
        .identity()
        .filter(|i| !i.first_name.is_empty() && !i.last_name.is_empty());
    let Some(identity) = identity else {
        anyhow::bail!(views::MISSING_IDENTITY);
    };

    let courses = ctx
        .courses()
        .all()
        .await
        .map_err(fail("Failed to fetch courses. Please try again."))?;
    if !courses.iter().any(|c| c.title == course) {
        let titles: Vec<&str> = courses.iter().map(|c| c.title.as_str()).collect();
        anyhow::bail!(
            "Please select a course. Available: {}",
            if titles.is_empty() {
                "(none)".to_string()
            } else {
                titles.join(", ")
            }
        );
    }

    ctx.enrollments()
        .enroll(course, &identity.first_name, &identity.last_name)
        .await
        .map_err(fail("Enrollment failed. Please try again."))?;
    println!("Enrollment request submitted successfully!");
    Ok(())
}

async fn enrollments(ctx: &LmsContext, command: EnrollmentCommand) -> anyhow::Result<()> {
    let client = ctx.enrollments();
    let updated = match command {
        EnrollmentCommand::List {
            status,
            student,
            course,
        } => {
            let list = match (status, student, course) {
                (Some(status), _, _) => client.by_status(status).await,
                (_, Some(student), _) => client.by_student(student).await,
                (_, _, Some(course)) => client.by_course(course).await,
                _ => client.all().await,
            }
            .map_err(fail("Failed to fetch enrollments"))?;

            if list.is_empty() {
                println!("No enrollments.");
            }
            for enrollment in &list {
                println!("{}", views::enrollment_line(enrollment));
            }
            return Ok(());
        }
        EnrollmentCommand::Show { id } => {
            client.read(id).await.map_err(fail("Failed to fetch enrollment"))?
        }
        EnrollmentCommand::Approve { id } => client
            .approve(id)
            .await
            .map_err(fail("Failed to approve enrollment"))?,
        EnrollmentCommand::Reject { id } => client
            .reject(id)
            .await
            .map_err(fail("Failed to reject enrollment"))?,
        EnrollmentCommand::Reset { id } => client
            .reset(id)
            .await
            .map_err(fail("Failed to reset enrollment"))?,
        EnrollmentCommand::SetStatus { id, status } => client
            .set_status(id, status)
            .await
            .map_err(fail("Failed to update enrollment status"))?,
    };
    println!("{}", views::enrollment_line(&updated));
    Ok(())
}

// ============================================================================
// Quizzes and support
// ============================================================================

async fn quizzes(ctx: &LmsContext, command: QuizCommand) -> anyhow::Result<()> {
    match command {
        QuizCommand::List => {
            println!("Quizzes:");
            for (n, title) in quiz::CATALOG.iter().enumerate() {
                println!("  {}. {title}  ({})", n + 1, Page::Quiz(n + 1).path());
            }
        }
        QuizCommand::Grade { sheet, answers } => {
            let sheet = QuizSheet::load(&sheet)?;
            let answers = quiz::load_answers(&answers)?;
            let title = if sheet.title.is_empty() {
                quiz::catalog_title(sheet.id).unwrap_or("Quiz").to_string()
            } else {
                sheet.title.clone()
            };
            let result = quiz::grade(&sheet, &answers);
            println!("{}", views::quiz_result(&title, &sheet, &result));
        }
        QuizCommand::Stored => {
            let stored = ctx
                .quizzes()
                .all()
                .await
                .map_err(fail("Failed to fetch quizzes"))?;
            if stored.is_empty() {
                println!("No quizzes stored.");
            }
            for q in &stored {
                println!("{}", views::quiz_line(q));
            }
        }
    }
    Ok(())
}

async fn support(ctx: &LmsContext, command: SupportCommand) -> anyhow::Result<()> {
    let client = ctx.support();
    match command {
        SupportCommand::Contact {
            name,
            email,
            message,
        } => {
            if name.trim().is_empty() || email.trim().is_empty() || message.trim().is_empty() {
                anyhow::bail!("Please fill all required fields");
            }
            let request = SupportMessage {
                name: Some(name),
                email: Some(email),
                message: Some(message),
                ..Default::default()
            };
            client
                .contact(&request)
                .await
                .map_err(fail("Failed to send message"))?;
            println!("Your message has been sent. Support will get back to you.");
        }
        SupportCommand::List => {
            let messages = client
                .all()
                .await
                .map_err(fail("Failed to fetch support messages"))?;
            if messages.is_empty() {
                println!("No support messages.");
            }
            for message in &messages {
                println!("{}", views::support_message(message));
            }
        }
        SupportCommand::Show { id } => {
            let message = client
                .read(id)
                .await
                .map_err(fail("Failed to fetch support message"))?;
            println!("{}", views::support_message(&message));
        }
        SupportCommand::Update { id, message } => {
            let mut current = client
                .read(id)
                .await
                .map_err(fail("Failed to fetch support message"))?;
            current.id = Some(id);
            current.message = Some(message);
            let saved = client
                .update(&current)
                .await
                .map_err(fail("Failed to update support message"))?;
            println!("{}", views::support_message(&saved));
        }
    }
    Ok(())
}
