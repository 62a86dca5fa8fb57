use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::form::TesterForm;
use crate::request::ApiClient;
use crate::settings::{load_platform, load_token, save_credentials, FileSettingsStore, SettingsStore};
use crate::types::{EndpointDescriptor, ParamSpec, Platform};

#[derive(Parser)]
#[command(version, name = "api-tester", about = "Build, run and export documented API requests")]
pub struct Cli {
    /// Backend base URL (overrides API_TESTER_BASE_URL and the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Settings file holding the saved token and platform
    #[arg(long, global = true, env = "API_TESTER_SETTINGS")]
    pub settings_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliSubcommand,
}

/// Values entered into an endpoint form
#[derive(clap::Args)]
pub struct FormArgs {
    /// Endpoint id, as shown by `list`
    pub endpoint: String,

    /// Bearer token (defaults to the saved one)
    #[arg(long)]
    pub token: Option<String>,

    /// Platform header value: 3ts or gold (defaults to the saved one)
    #[arg(long)]
    pub platform: Option<Platform>,

    /// URL placeholder value, `name=value`
    #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Query parameter, `key=value`; order is kept
    #[arg(short = 'q', long = "query", value_parser = parse_key_value)]
    pub query: Vec<(String, String)>,

    /// All query parameters as one JSON object
    #[arg(long)]
    pub params_json: Option<String>,

    /// Raw JSON request body for POST and PUT
    #[arg(long)]
    pub body: Option<String>,
}

#[derive(Subcommand)]
pub enum CliSubcommand {
    /// Lists documented endpoints by category
    List {
        /// Only this category
        #[arg(short = 'c', long)]
        category: Option<String>,
        /// Case-insensitive filter over path, description and method
        #[arg(short = 's', long)]
        search: Option<String>,
    },

    /// Shows one endpoint's parameters
    Show {
        endpoint: String,
    },

    /// Prints the curl command for a request without sending it
    Curl {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Sends the request and prints the response
    Exec {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Shows or updates the saved token and platform
    Settings {
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        platform: Option<Platform>,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        let catalog = Catalog::builtin().context("Failed to load endpoint catalog")?;
        let base_url = AppConfig::load().base_url(self.base_url.as_deref());
        let store =
            FileSettingsStore::open(self.settings_file.unwrap_or_else(FileSettingsStore::default_path));

        match self.command {
            CliSubcommand::List { category, search } => {
                list(&catalog, category.as_deref(), search.as_deref().unwrap_or(""))?;
            }
            CliSubcommand::Show { endpoint } => {
                print!("{}", describe(catalog.find(&endpoint)?));
            }
            CliSubcommand::Curl { form } => {
                let tester = open_form(&catalog, &base_url, store, &form)?;
                println!("{}", tester.generate_curl()?);
            }
            CliSubcommand::Exec { form } => {
                let tester = open_form(&catalog, &base_url, store, &form)?;
                let client = ApiClient::new();
                let result = tester.execute(&client).await?;
                println!("{}", result.render());
                if result.is_failed() {
                    return Ok(ExitCode::FAILURE);
                }
            }
            CliSubcommand::Settings { token, platform } => {
                let mut store = store;
                if token.is_some() || platform.is_some() {
                    let token = token.unwrap_or_else(|| load_token(&store));
                    let platform = platform.unwrap_or_else(|| load_platform(&store));
                    save_credentials(&mut store, &token, platform)?;
                }
                println!("settings: {}", store.path().display());
                println!("token:    {}", load_token(&store));
                println!("platform: {}", load_platform(&store));
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}

fn open_form<S: SettingsStore>(
    catalog: &Catalog,
    base_url: &str,
    store: S,
    args: &FormArgs,
) -> Result<TesterForm<S>> {
    let endpoint = catalog.find(&args.endpoint)?.clone();
    let mut form = TesterForm::open(endpoint, base_url, store);

    if let Some(token) = &args.token {
        form.set_token(token.clone());
    }
    if let Some(platform) = args.platform {
        form.set_platform(platform);
    }
    if let Some(json) = &args.params_json {
        form.edit_params_json(json).context("Invalid --params-json")?;
    }
    for (name, value) in &args.params {
        form.set_url_param(name.clone(), value.clone());
    }
    for (key, value) in &args.query {
        form.set_query_param(key.clone(), value.clone());
    }
    if let Some(body) = &args.body {
        if !form.endpoint().method.has_body() {
            tracing::warn!(method = %form.endpoint().method, "body is ignored for this method");
        }
        form.edit_body(body).context("Invalid --body")?;
    }

    Ok(form)
}

fn list(catalog: &Catalog, category: Option<&str>, search: &str) -> Result<()> {
    let categories: Vec<_> = match category {
        Some(id) => vec![catalog
            .category(id)
            .with_context(|| format!("Unknown category: {}", id))?],
        None => catalog.categories.iter().collect(),
    };

    for category in categories {
        let endpoints = category.filter(search);
        if endpoints.is_empty() {
            continue;
        }
        println!("{} ({})", category.title, category.id);
        for endpoint in endpoints {
            println!(
                "  {:<6} {:<36} {}",
                endpoint.method.as_str(),
                endpoint.path_template,
                endpoint.id
            );
        }
    }
    Ok(())
}

fn describe(endpoint: &EndpointDescriptor) -> String {
    let mut out = format!(
        "{} {}\n{}\n",
        endpoint.method, endpoint.path_template, endpoint.description
    );

    let sections: [(&str, &[ParamSpec]); 3] = [
        ("URL Parameters", endpoint.url_params.as_slice()),
        ("Query Parameters", endpoint.query_params.as_slice()),
        ("Request Body", endpoint.body_params.as_slice()),
    ];
    for (title, params) in sections {
        if params.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{}:\n", title));
        for param in params {
            let required = if param.required { "required" } else { "optional" };
            out.push_str(&format!(
                "  {} ({}): {}\n",
                param.name, required, param.description
            ));
        }
    }

    if let Some(notes) = &endpoint.notes {
        out.push_str(&format!("\nNotes: {}\n", notes));
    }
    out
}
