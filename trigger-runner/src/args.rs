use std::fs;
use std::path::PathBuf;

use clap::Parser;
use missdemeanor::CRequest;

use crate::RunnerError;

#[derive(Parser, Debug, Clone)]
#[command(name = "trigger-runner")]
#[command(about = "Run a miss-demeanor trigger plugin against one request", long_about = None)]
pub struct Args {
    /// Path to the trigger plugin shared library
    #[arg(long, env = "TRIGGER_PLUGIN")]
    pub plugin: PathBuf,

    /// Exported symbol to call
    #[arg(long, env = "TRIGGER_SYMBOL", default_value = "trigger")]
    pub symbol: String,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request URI (path and query)
    #[arg(long, default_value = "/")]
    pub uri: String,

    /// Request header as `Name: value`; may be repeated
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Request body
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the request body from a file
    #[arg(long)]
    pub body_file: Option<PathBuf>,
}

impl Args {
    /// Build the host-side request the plugin will be handed.
    pub fn request(&self) -> Result<CRequest, RunnerError> {
        let body = match (&self.body, &self.body_file) {
            (Some(body), _) => body.clone().into_bytes(),
            (None, Some(path)) => fs::read(path).map_err(|source| RunnerError::Body {
                path: path.clone(),
                source,
            })?,
            (None, None) => Vec::new(),
        };

        let request = CRequest::new(self.method.as_str(), self.uri.as_str(), body)?
            .with_headers(self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str())))?;
        Ok(request)
    }
}

/// Split `Name: value` on the first colon.
pub fn parse_header(raw: &str) -> Result<(String, String), RunnerError> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err(RunnerError::InvalidHeader(raw.to_owned()));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(RunnerError::InvalidHeader(raw.to_owned()));
    }
    Ok((name.to_owned(), value.trim().to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_splits_on_first_colon() {
        assert_eq!(
            parse_header("Host: localhost:8080").unwrap(),
            ("Host".to_owned(), "localhost:8080".to_owned())
        );
        assert_eq!(
            parse_header("  X-Empty :   ").unwrap(),
            ("X-Empty".to_owned(), String::new())
        );
    }

    #[test]
    fn header_without_name_or_colon_is_rejected() {
        assert!(matches!(
            parse_header("no-colon"),
            Err(RunnerError::InvalidHeader(h)) if h == "no-colon"
        ));
        assert!(matches!(
            parse_header(" : value"),
            Err(RunnerError::InvalidHeader(_))
        ));
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["trigger-runner", "--plugin", "./libplugin.so"]).unwrap();
        assert_eq!(args.symbol, "trigger");
        assert_eq!(args.method, "GET");
        assert_eq!(args.uri, "/");
        assert!(args.headers.is_empty());
        assert!(args.body.is_none() && args.body_file.is_none());
    }

    #[test]
    fn body_and_body_file_conflict() {
        let result = Args::try_parse_from([
            "trigger-runner",
            "--plugin",
            "p.so",
            "--body",
            "x",
            "--body-file",
            "b.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn bad_header_flag_fails_parsing() {
        let result =
            Args::try_parse_from(["trigger-runner", "--plugin", "p.so", "-H", "not a header"]);
        assert!(result.is_err());
    }
}
