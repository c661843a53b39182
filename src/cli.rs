use crate::constants::{API_BASE_ENV_VAR, API_KEY_ENV_VAR, ENDPOINT_ENV_VAR, TOKEN_ENV_VAR};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tinify-shrink",
    about = "Compress remote images through the tinify-png-shrink service",
    long_about = "tinify-shrink sends an image URL to the tinify-png-shrink compression service \
                  and returns the URL of the compressed image. It can also probe both images' \
                  sizes, report the space saved, download the result, and process lists of URLs.",
    version,
    after_help = "EXAMPLES:\n  \
    tinify-shrink compress https://example.com/photo.png\n  \
    tinify-shrink stats https://example.com/photo.png --json\n  \
    tinify-shrink compress https://example.com/photo.png -o ./compressed/\n  \
    tinify-shrink batch --from urls.txt\n  \
    tinify-shrink compress-file ./photo.png --api-base https://console.example.com"
)]
pub struct Args {
    #[arg(
        long,
        global = true,
        env = ENDPOINT_ENV_VAR,
        help = "Compression endpoint URL",
        long_help = "Override the compression endpoint. \
                     Default: https://fusion-api.oomol.com/v1/tinify-png-shrink/action/compress"
    )]
    pub endpoint: Option<String>,

    #[arg(
        long,
        global = true,
        env = TOKEN_ENV_VAR,
        hide_env_values = true,
        help = "Access token for the compression service"
    )]
    pub token: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Show debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Only print results and errors"
    )]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Compress an image and print the compressed URL",
        long_about = "Send an image URL to the compression service and print the URL of the \
                      compressed image. No size probing is performed."
    )]
    Compress {
        #[arg(help = "URL of the image to compress")]
        image_url: String,

        #[arg(
            short = 'o',
            long,
            help = "Download the compressed image to this file or directory"
        )]
        output: Option<PathBuf>,

        #[arg(long, help = "Print the result as JSON")]
        json: bool,
    },

    #[command(
        about = "Compress an image and report size savings",
        long_about = "Compress an image, read both images' sizes with HEAD requests and print \
                      a markdown report with the compression ratio and space saved."
    )]
    Stats {
        #[arg(help = "URL of the image to compress")]
        image_url: String,

        #[arg(
            short = 'o',
            long,
            help = "Download the compressed image to this file or directory"
        )]
        output: Option<PathBuf>,

        #[arg(long, help = "Print the result as JSON instead of the report")]
        json: bool,
    },

    #[command(
        about = "Compress several images one after another",
        long_about = "Compress every given URL sequentially and print a comparison table. \
                      Failures are reported and do not stop the batch."
    )]
    Batch {
        #[arg(help = "Image URLs to compress")]
        urls: Vec<String>,

        #[arg(
            short = 'f',
            long = "from",
            help = "Read image URLs from a file (one per line)",
            long_help = "Read image URLs from a text file, one per line. \
                         Blank lines and lines starting with '#' are ignored."
        )]
        from: Option<PathBuf>,

        #[arg(long, help = "Print the summary as JSON instead of the table")]
        json: bool,
    },

    #[command(
        about = "Compress a local image file",
        long_about = "Upload a local image to the compression task API, download the \
                      compressed result and report the space saved. Without --output the \
                      result is written next to the input as <name>_compressed<ext>."
    )]
    CompressFile {
        #[arg(help = "Path to the image file to compress")]
        input: PathBuf,

        #[arg(
            short = 'o',
            long,
            help = "Write the compressed image to this file or directory"
        )]
        output: Option<PathBuf>,

        #[arg(long, env = API_BASE_ENV_VAR, help = "Base URL of the compression task API")]
        api_base: String,

        #[arg(
            long,
            env = API_KEY_ENV_VAR,
            hide_env_values = true,
            help = "API key sent as a bearer token"
        )]
        api_key: Option<String>,

        #[arg(long, help = "Print the result as JSON instead of the report")]
        json: bool,
    },
}
