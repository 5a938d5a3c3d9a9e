use clap::builder::PossibleValue;
use clap::{crate_authors, crate_description, crate_name, crate_version, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    let mut args = vec![
        Arg::new("log-level")
            .long("log-level")
            .value_name("LOG_LEVEL")
            .env("DSMLP_LOG_LEVEL")
            .default_value("info")
            .value_parser([
                PossibleValue::new("trace"),
                PossibleValue::new("debug"),
                PossibleValue::new("info"),
                PossibleValue::new("warn"),
                PossibleValue::new("error"),
            ])
            .help("Log level"),
        Arg::new("log-fmt")
            .long("log-fmt")
            .value_name("LOG_FMT")
            .env("DSMLP_LOG_FMT")
            .default_value("text")
            .value_parser([PossibleValue::new("text"), PossibleValue::new("json")])
            .help("Log output format"),
        Arg::new("log-no-color")
            .long("log-no-color")
            .env("NO_COLOR")
            .action(ArgAction::SetTrue)
            .help("Disable colored output for logs"),
        Arg::new("address")
            .long("addr")
            .value_name("BIND_ADDRESS")
            .default_value("0.0.0.0")
            .env("DSMLP_BIND_ADDRESS")
            .help("Bind against ADDRESS"),
        Arg::new("port")
            .long("port")
            .value_name("PORT")
            .default_value("8080")
            .env("DSMLP_PORT")
            .help("Listen on PORT"),
        Arg::new("cert-file")
            .long("cert-file")
            .value_name("CERT_FILE")
            .default_value("")
            .env("DSMLP_CERT_FILE")
            .help("Path to an X.509 certificate file for HTTPS"),
        Arg::new("key-file")
            .long("key-file")
            .value_name("KEY_FILE")
            .default_value("")
            .env("DSMLP_KEY_FILE")
            .help("Path to an X.509 private key file for HTTPS"),
        Arg::new("awsed-endpoint")
            .long("awsed-endpoint")
            .value_name("URL")
            .env("AWSED_ENDPOINT")
            .required(true)
            .help("Base URL of the AWSEd REST API"),
        Arg::new("awsed-api-key")
            .long("awsed-api-key")
            .value_name("API_KEY")
            .env("AWSED_API_KEY")
            .hide_env_values(true)
            .required(true)
            .help("API key used to authenticate against AWSEd"),
        Arg::new("gpu-resource")
            .long("gpu-resource")
            .value_name("RESOURCE")
            .env("DSMLP_GPU_RESOURCE")
            .default_value(dsmlp_policy_engine::constants::DEFAULT_GPU_RESOURCE)
            .help("Extended resource accounted against the GPU quota"),
        Arg::new("gpu-quota-annotation")
            .long("gpu-quota-annotation")
            .value_name("ANNOTATION")
            .env("DSMLP_GPU_QUOTA_ANNOTATION")
            .default_value("gpu-quota")
            .help("Namespace annotation holding the GPU quota of the Namespace"),
        Arg::new("low-priority-class")
            .long("low-priority-class")
            .value_name("PRIORITY_CLASS")
            .env("DSMLP_LOW_PRIORITY_CLASS")
            .default_value(dsmlp_policy_engine::constants::DEFAULT_LOW_PRIORITY_CLASS)
            .help("Priority class of the Pods that are never blocked by the GPU quota"),
        Arg::new("namespace-label-gate")
            .long("namespace-label-gate")
            .value_name("LABEL")
            .env("DSMLP_NAMESPACE_LABEL_GATE")
            .required(false)
            .help("Only validate Pods created inside of Namespaces carrying this label"),
        Arg::new("max-concurrent-requests")
            .long("max-concurrent-requests")
            .value_name("REQUESTS")
            .env("DSMLP_MAX_CONCURRENT_REQUESTS")
            .help("Maximum number of admission reviews evaluated at the same time, defaults to the number of CPUs"),
    ];
    args.sort_by(|a, b| a.get_id().cmp(b.get_id()));

    Command::new(crate_name!())
        .author(crate_authors!())
        .version(crate_version!())
        .about(crate_description!())
        .args(args)
}
