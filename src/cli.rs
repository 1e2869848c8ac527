use clap::Parser;
use serde_json::Value;

use crate::dialogs::DialogChoice;

#[derive(Parser, Debug)]
#[command(name = "lazymodal", version, about = "One modal dialog at a time, in your terminal")]
pub struct Args {
    /// Dialog to open on startup
    #[arg(short, long, value_enum)]
    pub open: Option<DialogChoice>,

    /// JSON object merged over the props of the dialog given with --open
    #[arg(long, value_name = "JSON", requires = "open", value_parser = parse_json)]
    pub props: Option<Value>,

    /// Present and dismiss dialogs without animations
    #[arg(long)]
    pub no_animation: bool,
}

fn parse_json(value: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from(["lazymodal", "--open", "confirm", "--no-animation"]).unwrap();
        assert_eq!(args.open, Some(DialogChoice::Confirm));
        assert!(args.no_animation);

        let args = Args::try_parse_from(["lazymodal"]).unwrap();
        assert_eq!(args.open, None);
        assert!(!args.no_animation);

        assert!(Args::try_parse_from(["lazymodal", "--open", "wizard"]).is_err());
    }

    #[test]
    fn test_parse_props() {
        let args = Args::try_parse_from([
            "lazymodal",
            "--open",
            "info",
            "--props",
            r#"{"message": "Build failed", "error": true}"#,
        ])
        .unwrap();
        assert_eq!(
            args.props,
            Some(serde_json::json!({"message": "Build failed", "error": true}))
        );

        assert!(Args::try_parse_from(["lazymodal", "--open", "info", "--props", "{"]).is_err());
        assert!(Args::try_parse_from(["lazymodal", "--props", "{}"]).is_err());
    }
}
