use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tree_translate::{Dialect, OutputFormat, flatten, parse, sample_input};
use tree_translate_mt::{
    BatchOptions, LANGUAGES, MockGateway, MockMode, ProxyGateway, TranslationGateway,
    TreeTranslator,
};

fn cli() -> Command {
    Command::new("tree-translate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate the strings of a text, JSON or PHP array file and keep its structure")
        .arg(
            Arg::new("input")
                .help("File to translate (default: standard input)")
                .index(1),
        )
        .arg(
            Arg::new("dialect")
                .long("dialect")
                .short('d')
                .help("Input format")
                .value_parser(["auto", "text", "json", "simple-json", "php"])
                .default_value("auto"),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .short('f')
                .help("Source language code")
                .default_value("auto"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .short('t')
                .help("Target language code (e.g., zh, en, jp, fra)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output format (default: same as the input)")
                .value_parser(["json", "module", "php", "text"]),
        )
        .arg(
            Arg::new("export")
                .long("export")
                .help("Append `export default <name>;` to module output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("module-name")
                .long("module-name")
                .help("Variable name for module output (default: target language)"),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .help("Strings per request (default: 8 for simple-json, 10 otherwise)")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("delay-ms")
                .long("delay-ms")
                .help("Pause between requests in milliseconds")
                .value_parser(value_parser!(u64))
                .default_value("300"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use the mock gateway instead of the translation proxy")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .help("Write the result to this file instead of standard output"),
        )
        .arg(
            Arg::new("sample")
                .long("sample")
                .help("Print an example input for a format and exit")
                .value_parser(["text", "json", "simple-json", "php"]),
        )
        .arg(
            Arg::new("list-languages")
                .long("list-languages")
                .help("List supported language codes and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every request")
                .action(ArgAction::SetTrue),
        )
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(matches: &ArgMatches) -> std::io::Result<String> {
    match matches.get_one::<String>("input").map(String::as_str) {
        Some(path) if path != "-" => std::fs::read_to_string(path),
        _ => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

fn output_format(matches: &ArgMatches, dialect: Dialect, to: &str) -> OutputFormat {
    let module_name = || {
        matches
            .get_one::<String>("module-name")
            .cloned()
            .unwrap_or_else(|| to.to_string())
    };
    match matches.get_one::<String>("output").map(String::as_str) {
        Some("json") => OutputFormat::Json,
        Some("module") => OutputFormat::Module {
            name: module_name(),
        },
        Some("php") => OutputFormat::Php,
        Some("text") => OutputFormat::Text,
        _ => match dialect {
            Dialect::Php => OutputFormat::Php,
            Dialect::Text => OutputFormat::Text,
            Dialect::Json | Dialect::SimpleJson => OutputFormat::Json,
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    if matches.get_flag("list-languages") {
        for language in LANGUAGES {
            println!("{:<6} {}", language.code, language.name);
        }
        return Ok(());
    }

    if let Some(name) = matches.get_one::<String>("sample") {
        let dialect: Dialect = name.parse()?;
        println!("{}", sample_input(dialect));
        return Ok(());
    }

    let to = matches
        .get_one::<String>("to")
        .ok_or("--to is required (see --list-languages)")?;
    let from = matches
        .get_one::<String>("from")
        .map(String::as_str)
        .unwrap_or("auto");

    let raw = read_input(&matches)?;
    let dialect = match matches.get_one::<String>("dialect").map(String::as_str) {
        Some("auto") | None => Dialect::detect(&raw),
        Some(name) => name.parse()?,
    };
    tracing::debug!(%dialect, "Parsing input");

    let tree = parse(&raw, dialect)?;
    tracing::info!(
        strings = flatten(&tree).len(),
        dialect = dialect.as_str(),
        "Parsed input"
    );

    let mut options = BatchOptions::for_dialect(dialect);
    if let Some(&chunk_size) = matches.get_one::<usize>("chunk-size") {
        options = options.with_chunk_size(chunk_size);
    }
    if let Some(&delay) = matches.get_one::<u64>("delay-ms") {
        options = options.with_pace(Duration::from_millis(delay));
    }

    let gateway: Arc<dyn TranslationGateway> = if matches.get_flag("mock") {
        Arc::new(MockGateway::new(MockMode::Suffix))
    } else {
        Arc::new(ProxyGateway::from_env().map_err(|e| {
            format!(
                "{}\n   Set TREE_TRANSLATE_APPID and TREE_TRANSLATE_API_KEY, or use --mock",
                e
            )
        })?)
    };

    let translator = TreeTranslator::new(gateway).with_options(options);
    let translated = translator.translate_tree(&tree, from, to).await?;
    if let Some(partial) = translated.partial() {
        eprintln!("warning: {}", partial);
    }

    let format = output_format(&matches, dialect, to);
    let output = translated.render(&format, matches.get_flag("export"));
    match matches.get_one::<String>("out") {
        Some(path) => {
            std::fs::write(path, format!("{}\n", output))?;
            tracing::info!(path = %path, "Wrote translation");
        }
        None => println!("{}", output),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn test_default_output_follows_dialect() {
        let matches = cli().get_matches_from(["tree-translate", "--to", "zh"]);
        assert_eq!(output_format(&matches, Dialect::Php, "zh"), OutputFormat::Php);
        assert_eq!(output_format(&matches, Dialect::SimpleJson, "zh"), OutputFormat::Json);
        assert_eq!(output_format(&matches, Dialect::Text, "zh"), OutputFormat::Text);
    }

    #[test]
    fn test_module_name_defaults_to_target() {
        let matches = cli().get_matches_from(["tree-translate", "--to", "kor", "--output", "module"]);
        assert_eq!(
            output_format(&matches, Dialect::Json, "kor"),
            OutputFormat::Module {
                name: "kor".to_string()
            }
        );

        let matches = cli().get_matches_from([
            "tree-translate",
            "--to",
            "kor",
            "--output",
            "module",
            "--module-name",
            "messages",
        ]);
        assert_eq!(
            output_format(&matches, Dialect::Json, "kor"),
            OutputFormat::Module {
                name: "messages".to_string()
            }
        );
    }

    #[test]
    fn test_chunk_size_is_parsed() {
        let matches = cli().get_matches_from(["tree-translate", "--to", "zh", "--chunk-size", "4"]);
        assert_eq!(matches.get_one::<usize>("chunk-size"), Some(&4));
        assert!(cli()
            .try_get_matches_from(["tree-translate", "--chunk-size", "four"])
            .is_err());
    }
}
