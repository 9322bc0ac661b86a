use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("depscout")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("depscout")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Log every page visit and extraction decision")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Discover socials, documentation and contract deployments for a project \
                URL or a list of project URLs. Results are appended to the output file.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The project URL to crawl")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of project URLs to crawl")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("JSON file holding the crawl results")
                        .default_value("crawled-protocols.json"),
                )
                .arg(
                    arg!(-r --"report" <PATH>)
                        .required(false)
                        .help("Save the text report to a file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-c --"concurrency" <NUM_ROOTS>)
                        .required(false)
                        .help("How many project URLs are crawled at the same time")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("40"),
                )
                .arg(
                    arg!(--"max-depth" <DEPTH>)
                        .required(false)
                        .help("Deepest link hop followed inside the documentation")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"max-visits" <PAGES>)
                        .required(false)
                        .help("Page loads allowed per project URL")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1000"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                )
                .arg(
                    arg!(--"isolated")
                        .required(false)
                        .help("Give every project URL its own visited set instead of sharing one")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"fresh")
                        .required(false)
                        .help("Ignore existing results instead of resuming from them")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("extract")
                .about("Load a single page and print the contract deployments found on it as JSON")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The page to extract from")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("30"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_valid() {
        command_argument_builder().debug_assert();
    }

    #[test]
    fn test_crawl_defaults() {
        let matches = command_argument_builder()
            .try_get_matches_from(["depscout", "crawl", "-u", "https://acme.io"])
            .unwrap();
        let (_, crawl) = matches.subcommand().unwrap();
        assert_eq!(crawl.get_one::<usize>("concurrency"), Some(&40));
        assert_eq!(crawl.get_one::<usize>("max-depth"), Some(&10));
        assert_eq!(
            crawl.get_one::<String>("output").map(String::as_str),
            Some("crawled-protocols.json")
        );
        assert!(!crawl.get_flag("isolated"));
    }

    #[test]
    fn test_url_and_hosts_file_conflict() {
        let result = command_argument_builder().try_get_matches_from([
            "depscout",
            "crawl",
            "-u",
            "https://acme.io",
            "-H",
            "hosts.txt",
        ]);
        assert!(result.is_err());
    }
}
