use anyhow::{anyhow, bail, Context};
use browser_forms::core::FormControl;
use browser_forms::{Config, DomProcessor, FieldValue, Form};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

fn cli() -> Command {
    Command::new("formscan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect HTML forms and build their request arguments")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .help("JSON configuration file"),
        )
        .subcommand(
            Command::new("inspect")
                .about("List the forms in a document with their fields")
                .arg(Arg::new("file").required(true).help("HTML file to read")),
        )
        .subcommand(
            Command::new("payload")
                .about("Serialize a form into request arguments")
                .arg(Arg::new("file").required(true).help("HTML file to read"))
                .arg(
                    Arg::new("form-id")
                        .long("form-id")
                        .help("Select the form with this id"),
                )
                .arg(
                    Arg::new("index")
                        .long("index")
                        .value_parser(clap::value_parser!(usize))
                        .conflicts_with("form-id")
                        .help("Select the form at this position"),
                )
                .arg(
                    Arg::new("submit")
                        .long("submit")
                        .help("Name of the submit control to press"),
                )
                .arg(
                    Arg::new("set")
                        .long("set")
                        .action(ArgAction::Append)
                        .help("Assign a field, as name=value; repeat a name to pass a list"),
                )
                .arg(
                    Arg::new("base")
                        .long("base")
                        .help("URL of the page, used to resolve the form action"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    match matches.get_one::<String>("config") {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path)),
        None => Ok(Config::default()),
    }
}

async fn read_document(matches: &ArgMatches) -> anyhow::Result<String> {
    let path = matches
        .get_one::<String>("file")
        .ok_or_else(|| anyhow!("missing input file"))?;
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path))
}

fn describe(index: usize, form: &Form) -> Value {
    let fields: Vec<Value> = form
        .fields()
        .values()
        .map(|field| {
            json!({
                "name": field.name(),
                "kind": field.kind(),
                "value": field.value().to_string(),
                "options": field.options(),
                "disabled": field.disabled(),
            })
        })
        .collect();

    json!({
        "index": index,
        "id": form.id(),
        "method": form.method(),
        "action": form.action(),
        "fields": fields,
    })
}

/// Group `name=value` assignments by name; a repeated name becomes a list.
fn parse_assignments<'a>(
    raw: impl Iterator<Item = &'a String>,
) -> anyhow::Result<Vec<(String, Vec<String>)>> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for item in raw {
        let (name, value) = item
            .split_once('=')
            .ok_or_else(|| anyhow!("expected name=value, got {:?}", item))?;
        match grouped.iter_mut().find(|(key, _)| key == name) {
            Some((_, values)) => values.push(value.to_string()),
            None => grouped.push((name.to_string(), vec![value.to_string()])),
        }
    }
    Ok(grouped)
}

fn select_form(processor: &DomProcessor, html: &str, matches: &ArgMatches) -> anyhow::Result<Form> {
    if let Some(id) = matches.get_one::<String>("form-id") {
        return Ok(processor.form_by_id(html, id)?);
    }
    let index = matches.get_one::<usize>("index").copied().unwrap_or(0);
    let mut forms = processor.forms(html)?;
    if index >= forms.len() {
        bail!("form index {} out of range ({} forms)", index, forms.len());
    }
    Ok(forms.swap_remove(index))
}

async fn inspect(config: &Config, matches: &ArgMatches) -> anyhow::Result<Value> {
    let html = read_document(matches).await?;
    let forms = DomProcessor::new(config.parser.clone()).forms(&html)?;
    info!(forms = forms.len(), "parsed document");
    Ok(Value::Array(
        forms
            .iter()
            .enumerate()
            .map(|(index, form)| describe(index, form))
            .collect(),
    ))
}

async fn payload(config: &Config, matches: &ArgMatches) -> anyhow::Result<Value> {
    let html = read_document(matches).await?;
    let processor = DomProcessor::new(config.parser.clone());
    let mut form = select_form(&processor, &html, matches)?;

    let assignments = parse_assignments(matches.get_many::<String>("set").into_iter().flatten())?;
    for (name, mut values) in assignments {
        debug!(name = %name, values = values.len(), "assigning field");
        let value = if values.len() == 1 {
            FieldValue::Text(values.remove(0))
        } else {
            FieldValue::List(values)
        };
        form.set(&name, value)
            .with_context(|| format!("failed to set field {:?}", name))?;
    }

    let submit = match matches.get_one::<String>("submit") {
        Some(name) => Some(
            form.submit_field(name)
                .ok_or_else(|| anyhow!("no submit control named {:?}", name))?,
        ),
        None => None,
    };

    let value = match matches.get_one::<String>("base") {
        Some(base) => {
            let base = Url::parse(base).with_context(|| format!("invalid base URL {:?}", base))?;
            serde_json::to_value(form.submission_with(&base, submit, &config.export)?)?
        }
        None => {
            let args = form
                .serialize(submit)?
                .to_requests_with(form.method(), &config.export);
            serde_json::to_value(&args)?
        }
    };
    Ok(value)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    let output = match matches.subcommand() {
        Some(("inspect", sub)) => inspect(&load_config(sub)?, sub).await?,
        Some(("payload", sub)) => payload(&load_config(sub)?, sub).await?,
        _ => bail!("unknown command"),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
