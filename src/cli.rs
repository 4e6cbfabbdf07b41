use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::api::{
    build_authorize_url, parse_oauth_callback, ApiClient, ApiError, AuthApi, CustomerGateway,
    HttpCustomerGateway,
};
use crate::config::AppConfig;
use crate::input::{MaskKind, MaskedInput};
use crate::models::{
    CustomerDraft, CustomerListQuery, CustomerStatus, FieldErrors, LoginRequest, RegisterRequest,
    SecurityValidators, Session, SortDirection, Validatable, ValidationContext, Validators,
};
use crate::store::SessionStore;
use crate::telemetry::{ConsoleNotifier, LogLevel, Notifier, Telemetry};

/// Pulse Backoffice - console for customer management
#[derive(Parser)]
#[command(name = "pulsectl")]
#[command(about = "A terminal console for the Pulse banking backoffice")]
#[command(
    long_about = "Pulse Backoffice - Manage customer records and operator sessions\n\nAuthenticate with 'pulsectl login', then operate on /customers."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with CPF and password
    Login {
        cpf: String,
        #[arg(long)]
        password: String,
    },
    /// Register a new operator account
    Register {
        #[arg(long)]
        cpf: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
    },
    /// Drop the stored session
    Logout,
    /// Show the operator behind the stored session
    Whoami,
    /// Exchange the refresh token for a new access token
    Refresh,
    /// List external sign-in providers offered by the backend
    Providers,
    /// Print the Google sign-in authorize URL
    OauthUrl {
        #[arg(long)]
        redirect_uri: Option<String>,
    },
    /// Complete a Google sign-in from the pasted callback URL
    OauthComplete { callback_url: String },
    /// List customers with search, filter, sort, and pagination
    List {
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
        #[arg(long, default_value = "nome")]
        sort_by: String,
        /// asc or desc
        #[arg(long, default_value = "asc")]
        sort_dir: String,
        /// Filter by name fragment
        #[arg(long)]
        nome: Option<String>,
        /// Filter by email fragment
        #[arg(long)]
        email: Option<String>,
        /// Filter by status (ATIVO or INATIVO)
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one customer
    Get { id: i64 },
    /// Create a customer
    Create {
        #[arg(long)]
        nome: String,
        #[arg(long)]
        cpf: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        telefone: String,
        #[arg(long, default_value = "ATIVO")]
        status: String,
    },
    /// Update a customer; omitted fields keep their current value
    Update {
        id: i64,
        #[arg(long)]
        nome: Option<String>,
        #[arg(long)]
        cpf: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        telefone: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Delete a customer (deactivates active records)
    Delete {
        id: i64,
        /// Confirm without prompting
        #[arg(long)]
        yes: bool,
    },
    /// Show customer statistics
    Stats,
    /// Show event log entries recorded by this invocation
    Logs {
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        component: Option<String>,
    },
    /// Render the diagnostic report
    Report {
        #[arg(long)]
        component: Option<String>,
    },
    /// Show configuration, session, and backend reachability
    Status,
    /// Show version information
    Version,
}

/// Everything a command handler needs, owned by the composition root.
///
/// The telemetry context is created here and passed by reference; nothing
/// in the library reaches for global state.
pub struct AppContext {
    pub config: AppConfig,
    pub telemetry: Telemetry,
    pub store: SessionStore,
}

impl AppContext {
    fn from_environment() -> Result<Self> {
        let config = AppConfig::load()?;
        let telemetry =
            Telemetry::with_min_level(config.min_log_level, Box::new(ConsoleNotifier));
        let store = SessionStore::new(SessionStore::default_path()?);

        Ok(Self {
            config,
            telemetry,
            store,
        })
    }

    fn session(&self) -> Option<Session> {
        self.store.load(self.telemetry.log())
    }

    /// API client carrying the stored session's token, when one is active
    fn client(&self) -> Result<ApiClient> {
        let client = ApiClient::new(&self.config.api_url)
            .with_context(|| format!("backend URL '{}' is not usable", self.config.api_url))?;
        Ok(client.with_bearer(self.session().map(|session| session.access_token)))
    }

    fn gateway(&self) -> Result<HttpCustomerGateway> {
        Ok(HttpCustomerGateway::new(self.client()?))
    }

    fn auth(&self) -> Result<AuthApi> {
        Ok(AuthApi::new(self.client()?))
    }

    /// Route a failed backend call through the classifier exactly once.
    ///
    /// HTTP and network failures are classified (which logs and notifies);
    /// anything else is an application fault.
    fn report_api_failure(&self, error: ApiError, component: &str, action: &str) -> anyhow::Error {
        let classified = error.classification().map(|(status, body)| {
            self.telemetry
                .classify_http(status, body, component, action)
                .technical_message
        });

        let technical = classified.unwrap_or_else(|| {
            let error = anyhow::Error::new(error);
            self.telemetry
                .report_application(&error, component, action)
                .technical_message
        });

        anyhow::anyhow!("{component}::{action} failed: {technical}")
    }

    /// Print the field-error map the way the form highlights fields
    fn report_invalid_form(&self, errors: &FieldErrors, component: &str, action: &str) {
        self.telemetry.report_validation(errors, component, action);
        println!("⚠️  Corrija os campos antes de continuar:");
        for (field, message) in errors {
            println!("   • {field}: {message}");
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let ctx = AppContext::from_environment()?;

    match cli.command {
        Commands::Login { cpf, password } => login(&ctx, &cpf, &password).await,
        Commands::Register {
            cpf,
            email,
            password,
            full_name,
        } => register(&ctx, &cpf, &email, &password, &full_name).await,
        Commands::Logout => logout(&ctx),
        Commands::Whoami => whoami(&ctx),
        Commands::Refresh => refresh(&ctx).await,
        Commands::Providers => providers(&ctx).await,
        Commands::OauthUrl { redirect_uri } => oauth_url(&ctx, redirect_uri.as_deref()).await,
        Commands::OauthComplete { callback_url } => oauth_complete(&ctx, &callback_url),
        Commands::List {
            page,
            size,
            sort_by,
            sort_dir,
            nome,
            email,
            status,
        } => {
            let query = build_list_query(page, size, sort_by, &sort_dir, nome, email, status)?;
            list_customers(&ctx, query).await
        }
        Commands::Get { id } => get_customer(&ctx, id).await,
        Commands::Create {
            nome,
            cpf,
            email,
            telefone,
            status,
        } => create_customer(&ctx, nome, cpf, email, telefone, &status).await,
        Commands::Update {
            id,
            nome,
            cpf,
            email,
            telefone,
            status,
        } => update_customer(&ctx, id, nome, cpf, email, telefone, status).await,
        Commands::Delete { id, yes } => delete_customer(&ctx, id, yes).await,
        Commands::Stats => stats(&ctx).await,
        Commands::Logs { level, component } => show_logs(&ctx, level.as_deref(), component.as_deref()),
        Commands::Report { component } => report(&ctx, component.as_deref()),
        Commands::Status => show_status(&ctx).await,
        Commands::Version => show_version(),
    }
}

/// Normalize a typed CPF to its masked display form
fn masked_cpf(raw: &str) -> String {
    let mut input = MaskedInput::from_raw(MaskKind::Cpf, raw);
    input.blur();
    input.value().to_string()
}

/// Normalize a typed phone to its masked display form
fn masked_phone(raw: &str) -> String {
    let mut input = MaskedInput::from_raw(MaskKind::Phone, raw);
    input.blur();
    input.value().to_string()
}

async fn login(ctx: &AppContext, cpf: &str, password: &str) -> Result<()> {
    let cpf = masked_cpf(cpf);

    let mut form = ValidationContext::new(ctx.config.cpf_validator());
    form.check("cpf", Validators::not_empty(&cpf, "cpf"));
    form.check("cpf", form.cpf().validate(&cpf, "cpf"));
    form.check("password", Validators::not_empty(password, "password"));
    if let Err(errors) = form.result() {
        ctx.report_invalid_form(&errors, "Login", "submit");
        bail!("login blocked by invalid credentials form");
    }

    println!("🔐 Authenticating against {}...", ctx.config.api_url);

    let credentials = LoginRequest {
        cpf,
        password: password.to_string(),
    };
    let response = ctx
        .auth()?
        .login(&credentials)
        .await
        .map_err(|error| ctx.report_api_failure(error, "Login", "submit"))?;

    let session = Session::from_auth(&response);
    ctx.store.save(&session)?;
    ctx.telemetry.log().info(
        "Login",
        "submit",
        &format!("operator {} authenticated", session.user.username),
        None,
    );
    ctx.telemetry
        .notifier()
        .success("Login realizado com sucesso");
    print_operator(&session);

    Ok(())
}

async fn register(
    ctx: &AppContext,
    cpf: &str,
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<()> {
    let cpf = masked_cpf(cpf);

    let mut form = ValidationContext::new(ctx.config.cpf_validator());
    form.check("cpf", Validators::not_empty(&cpf, "cpf"));
    form.check("cpf", form.cpf().validate(&cpf, "cpf"));
    form.check("email", Validators::not_empty(email, "email"));
    form.check("email", Validators::email(email, "email"));
    form.check("fullName", Validators::not_empty(full_name, "fullName"));
    form.check(
        "password",
        SecurityValidators::password_strength(password, "password"),
    );
    if let Err(errors) = form.result() {
        ctx.report_invalid_form(&errors, "Register", "submit");
        bail!("registration blocked by invalid form");
    }

    println!("📝 Registering operator {full_name}...");

    let payload = RegisterRequest {
        cpf,
        email: email.to_string(),
        password: password.to_string(),
        full_name: full_name.to_string(),
    };
    let response = ctx
        .auth()?
        .register(&payload)
        .await
        .map_err(|error| ctx.report_api_failure(error, "Register", "submit"))?;

    let session = Session::from_auth(&response);
    ctx.store.save(&session)?;
    ctx.telemetry
        .notifier()
        .success("Cadastro realizado com sucesso");
    print_operator(&session);

    Ok(())
}

fn logout(ctx: &AppContext) -> Result<()> {
    ctx.store.clear()?;
    ctx.telemetry.log().info("Session", "logout", "session cleared", None);
    println!("👋 Sessão encerrada");
    Ok(())
}

fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.session() {
        Some(session) => {
            print_operator(&session);
            println!(
                "   Token expira em {} minuto(s)",
                session.remaining().num_minutes()
            );
            Ok(())
        }
        None => {
            println!("🔓 Nenhuma sessão ativa. Use 'pulsectl login'.");
            Ok(())
        }
    }
}

async fn refresh(ctx: &AppContext) -> Result<()> {
    let Some(mut session) = ctx.session() else {
        bail!("no active session to refresh; run 'pulsectl login'");
    };

    println!("🔄 Refreshing access token...");

    let response = ctx
        .auth()?
        .refresh(&session.refresh_token)
        .await
        .map_err(|error| ctx.report_api_failure(error, "Session", "refresh"))?;

    session.apply_refresh(&response);
    ctx.store.save(&session)?;
    println!(
        "✅ Token renovado, expira em {} minuto(s)",
        session.remaining().num_minutes()
    );

    Ok(())
}

async fn providers(ctx: &AppContext) -> Result<()> {
    println!("🔍 Discovering sign-in providers...");

    let discovered = ctx
        .auth()?
        .providers()
        .await
        .map_err(|error| ctx.report_api_failure(error, "AuthProviders", "load"))?;

    if discovered.providers.is_empty() {
        println!("❌ No external providers configured");
        return Ok(());
    }

    for (name, info) in &discovered.providers {
        println!(
            "  🔑 {name}: {}",
            if info.enabled { "✅ enabled" } else { "❌ disabled" }
        );
        if let Some(url) = &info.authorization_url {
            println!("     Authorize: {url}");
        }
        if let Some(redirect) = &info.redirect_uri {
            println!("     Redirect:  {redirect}");
        }
        if let Some(scopes) = &info.scopes {
            println!("     Scopes:    {}", scopes.join(", "));
        }
    }

    Ok(())
}

async fn oauth_url(ctx: &AppContext, redirect_override: Option<&str>) -> Result<()> {
    let discovered = ctx
        .auth()?
        .providers()
        .await
        .map_err(|error| ctx.report_api_failure(error, "AuthProviders", "load"))?;

    let discovered_url = discovered
        .google()
        .filter(|google| google.enabled)
        .and_then(|google| google.authorization_url.clone());

    // Discovery first, configured fallback second.
    let target = discovered_url
        .or_else(|| ctx.config.oauth_google_url.clone())
        .context("Google sign-in is not enabled and no fallback URL is configured")?;

    let redirect = redirect_override.or(ctx.config.oauth_redirect_uri.as_deref());
    println!("{}", build_authorize_url(&target, redirect));
    println!();
    println!("🌐 Abra a URL acima no navegador e conclua o login.");
    println!("   Depois rode: pulsectl oauth-complete '<URL de retorno>'");

    Ok(())
}

fn oauth_complete(ctx: &AppContext, callback_url: &str) -> Result<()> {
    let session = match parse_oauth_callback(callback_url) {
        Ok(session) => session,
        Err(error) => {
            let error = anyhow::Error::new(error);
            ctx.telemetry
                .report_application(&error, "OAuthCallback", "complete");
            bail!("OAuth callback rejected: {error}");
        }
    };

    ctx.store.save(&session)?;
    ctx.telemetry
        .notifier()
        .success("Login via Google realizado com sucesso");
    print_operator(&session);

    Ok(())
}

fn build_list_query(
    page: u32,
    size: u32,
    sort_by: String,
    sort_dir: &str,
    nome: Option<String>,
    email: Option<String>,
    status: Option<String>,
) -> Result<CustomerListQuery> {
    let sort_dir: SortDirection = sort_dir.parse().map_err(|message: String| {
        anyhow::anyhow!(message)
    })?;
    let status = status
        .map(|status| status.parse::<CustomerStatus>())
        .transpose()
        .map_err(|message| anyhow::anyhow!(message))?;

    Ok(CustomerListQuery {
        page,
        size,
        sort_by,
        sort_dir,
        nome,
        email,
        status,
    })
}

async fn list_customers(ctx: &AppContext, query: CustomerListQuery) -> Result<()> {
    println!("📋 Listing customers...");

    let page = ctx
        .gateway()?
        .list(&query)
        .await
        .map_err(|error| ctx.report_api_failure(error, "CustomerList", "load"))?;

    if page.customers.is_empty() {
        println!("❌ Nenhum cliente encontrado");
        return Ok(());
    }

    println!(
        "{:<6} {:<30} {:<16} {:<30} {:<16} {:<8}",
        "ID", "NOME", "CPF", "EMAIL", "TELEFONE", "STATUS"
    );
    for customer in &page.customers {
        println!(
            "{:<6} {:<30} {:<16} {:<30} {:<16} {:<8}",
            customer.id,
            customer.nome,
            customer.cpf,
            customer.email,
            customer.telefone,
            customer.status
        );
    }

    println!();
    println!(
        "Mostrando {} - {} de {} registro(s), página {} de {}",
        page.first_shown(),
        page.last_shown(),
        page.total_elements,
        page.current_page + 1,
        page.total_pages.max(1)
    );

    Ok(())
}

async fn get_customer(ctx: &AppContext, id: i64) -> Result<()> {
    let customer = ctx
        .gateway()?
        .find_by_id(id)
        .await
        .map_err(|error| ctx.report_api_failure(error, "CustomerDetail", "load"))?;

    println!("👤 {}", customer.nome);
    println!("   ID:       {}", customer.id);
    println!("   CPF:      {}", customer.cpf);
    println!("   Email:    {}", customer.email);
    println!("   Telefone: {}", customer.telefone);
    println!("   Status:   {}", customer.status);
    if let Some(created_at) = customer.created_at {
        println!("   Criado:   {created_at}");
    }

    Ok(())
}

async fn create_customer(
    ctx: &AppContext,
    nome: String,
    cpf: String,
    email: String,
    telefone: String,
    status: &str,
) -> Result<()> {
    let status: CustomerStatus = status.parse().map_err(|message: String| {
        anyhow::anyhow!(message)
    })?;

    let draft = CustomerDraft {
        nome,
        cpf: masked_cpf(&cpf),
        email,
        telefone: masked_phone(&telefone),
        status,
    };

    if let Err(errors) = draft.validate(ctx.config.cpf_validator()) {
        ctx.report_invalid_form(&errors, "CustomerForm", "create");
        bail!("create blocked by invalid customer form");
    }

    println!("➕ Creating customer {}...", draft.nome);

    let customer = ctx
        .gateway()?
        .create(&draft)
        .await
        .map_err(|error| ctx.report_api_failure(error, "CustomerForm", "create"))?;

    ctx.telemetry
        .notifier()
        .success("Cliente criado com sucesso");
    println!("   ID atribuído: {}", customer.id);

    Ok(())
}

async fn update_customer(
    ctx: &AppContext,
    id: i64,
    nome: Option<String>,
    cpf: Option<String>,
    email: Option<String>,
    telefone: Option<String>,
    status: Option<String>,
) -> Result<()> {
    let status = status
        .map(|status| status.parse::<CustomerStatus>())
        .transpose()
        .map_err(|message| anyhow::anyhow!(message))?;

    // The edit form opens pre-filled; fetch the record and overlay changes.
    let gateway = ctx.gateway()?;
    let current = gateway
        .find_by_id(id)
        .await
        .map_err(|error| ctx.report_api_failure(error, "CustomerForm", "load"))?;

    let draft = CustomerDraft {
        nome: nome.unwrap_or(current.nome),
        cpf: cpf.map(|cpf| masked_cpf(&cpf)).unwrap_or(current.cpf),
        email: email.unwrap_or(current.email),
        telefone: telefone
            .map(|telefone| masked_phone(&telefone))
            .unwrap_or(current.telefone),
        status: status.unwrap_or(current.status),
    };

    if let Err(errors) = draft.validate(ctx.config.cpf_validator()) {
        ctx.report_invalid_form(&errors, "CustomerForm", "update");
        bail!("update blocked by invalid customer form");
    }

    println!("✏️  Updating customer {id}...");

    gateway
        .update(id, &draft)
        .await
        .map_err(|error| ctx.report_api_failure(error, "CustomerForm", "update"))?;

    ctx.telemetry
        .notifier()
        .success("Cliente atualizado com sucesso");

    Ok(())
}

async fn delete_customer(ctx: &AppContext, id: i64, yes: bool) -> Result<()> {
    if !yes {
        println!("⚠️  Exclusão requer confirmação: repita o comando com --yes");
        println!("   Clientes ativos são desativados; inativos são removidos.");
        return Ok(());
    }

    println!("🗑️  Deleting customer {id}...");

    let receipt = ctx
        .gateway()?
        .delete(id)
        .await
        .map_err(|error| ctx.report_api_failure(error, "CustomerList", "delete"))?;

    match receipt.action.as_str() {
        "DEACTIVATED" => ctx
            .telemetry
            .notifier()
            .success(&format!("Cliente {} desativado", receipt.customer_name)),
        _ => ctx
            .telemetry
            .notifier()
            .success(&format!("Cliente {} excluído", receipt.customer_name)),
    }

    Ok(())
}

async fn stats(ctx: &AppContext) -> Result<()> {
    println!("📊 Customer statistics");

    let stats = ctx
        .gateway()?
        .stats()
        .await
        .map_err(|error| ctx.report_api_failure(error, "CustomerStats", "load"))?;

    println!("   Total de clientes:   {}", stats.total_customers);
    println!("   Clientes ativos:     {}", stats.active_customers);
    println!("   Clientes inativos:   {}", stats.inactive_customers);
    println!("   Novos (30 dias):     {}", stats.recent_customers);

    Ok(())
}

fn show_logs(ctx: &AppContext, level: Option<&str>, component: Option<&str>) -> Result<()> {
    let level = level
        .map(|level| level.parse::<LogLevel>())
        .transpose()
        .map_err(|message| anyhow::anyhow!(message))?;

    let entries = ctx.telemetry.log().diagnostics(component, None, level);
    if entries.is_empty() {
        println!("📭 Nenhum evento registrado nesta execução");
        return Ok(());
    }

    for entry in entries {
        println!(
            "[{}] [{}] [{}::{}] {}",
            entry.timestamp.to_rfc3339(),
            entry.level,
            entry.component,
            entry.action,
            entry.message
        );
    }

    Ok(())
}

fn report(ctx: &AppContext, component: Option<&str>) -> Result<()> {
    println!("{}", ctx.telemetry.diagnostic_report(component));
    Ok(())
}

async fn show_status(ctx: &AppContext) -> Result<()> {
    println!("🏦 Pulse Backoffice Console");
    println!();
    println!("⚙️  Configuração");
    println!("   Backend:       {}", ctx.config.api_url);
    println!(
        "   Demo fixtures: {}",
        if ctx.config.demo_fixtures {
            "✅ ativadas"
        } else {
            "❌ desativadas"
        }
    );
    if let Ok(path) = AppConfig::default_path() {
        println!("   Config:        {}", path.display());
    }
    println!("   Sessão:        {}", ctx.store.path().display());
    println!();

    match ctx.session() {
        Some(session) => {
            println!(
                "🔐 Sessão ativa: {} ({}), expira em {} minuto(s)",
                session.user.full_name,
                session.user.role,
                session.remaining().num_minutes()
            );
        }
        None => println!("🔓 Nenhuma sessão ativa"),
    }
    println!();

    match ctx.auth()?.providers().await {
        Ok(_) => println!("🌐 Backend: ✅ acessível"),
        Err(error) => {
            let _ = ctx.report_api_failure(error, "Status", "probe");
            println!("🌐 Backend: ❌ inacessível");
        }
    }

    Ok(())
}

fn show_version() -> Result<()> {
    println!("pulsectl v{}", env!("CARGO_PKG_VERSION"));
    println!("Pulse Backoffice console");
    Ok(())
}

fn print_operator(session: &Session) {
    println!(
        "👤 {} <{}> | perfil {}",
        session.user.full_name, session.user.email, session.user.role
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_helpers_normalize_raw_digits() {
        assert_eq!(masked_cpf("11144477735"), "111.444.777-35");
        assert_eq!(masked_cpf("111.444.777-35"), "111.444.777-35");
        // Incomplete input is left in partial-progress shape.
        assert_eq!(masked_cpf("11144"), "111.44");

        assert_eq!(masked_phone("11988887777"), "(11) 98888-7777");
        assert_eq!(masked_phone("1133334444"), "(11) 3333-4444");
    }

    #[test]
    fn test_build_list_query_parses_filters() {
        let query = build_list_query(
            2,
            25,
            "email".to_string(),
            "desc",
            Some("silva".to_string()),
            None,
            Some("inativo".to_string()),
        )
        .unwrap();

        assert_eq!(query.page, 2);
        assert_eq!(query.size, 25);
        assert_eq!(query.sort_dir, SortDirection::Desc);
        assert_eq!(query.status, Some(CustomerStatus::Inativo));

        assert!(build_list_query(0, 10, "nome".to_string(), "sideways", None, None, None).is_err());
        assert!(build_list_query(
            0,
            10,
            "nome".to_string(),
            "asc",
            None,
            None,
            Some("PENDENTE".to_string())
        )
        .is_err());
    }
}
