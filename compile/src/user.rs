use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

use sudare::dictionary::{write_to_path, UserDictionaryBuilder};
use sudare::{Config, Dictionary, Resources};

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "user", about = "Compiles a user dictionary against a system dictionary.")]
struct Args {
    #[clap(short = 's', long)]
    system_filename: String,

    /// Directory containing char.def, unk.def, and rewrite.def.
    #[clap(short = 'r', long)]
    resource_dirname: String,

    #[clap(short = 'l', long, required = true, multiple_occurrences = true)]
    lexicon_filenames: Vec<String>,

    #[clap(short = 'o', long)]
    output_filename: String,

    #[clap(short = 'd', long, default_value = "")]
    description: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let resource_dir = Path::new(&args.resource_dirname);

    eprintln!("Loading the system dictionary...: {}", &args.system_filename);
    let start = Instant::now();
    let resources = Resources::from_readers(
        File::open(resource_dir.join("char.def"))?,
        File::open(resource_dir.join("unk.def"))?,
        File::open(resource_dir.join("rewrite.def"))?,
    )?;
    let dict = Dictionary::open(&args.system_filename, &Config::default(), &resources)?;
    eprintln!("{} seconds", start.elapsed().as_secs_f64());

    eprintln!("Compiling the user dictionary...");
    let start = Instant::now();
    let mut lexicons = vec![];
    for filename in &args.lexicon_filenames {
        lexicons.push(File::open(filename)?);
    }
    let bytes = UserDictionaryBuilder::from_readers(&dict, lexicons, &args.description)?;
    eprintln!("{} seconds", start.elapsed().as_secs_f64());

    eprintln!("Writing the user dictionary...: {}", &args.output_filename);
    write_to_path(&args.output_filename, &bytes)?;
    eprintln!("{} MiB", bytes.len() as f64 / (1024. * 1024.));

    Ok(())
}
