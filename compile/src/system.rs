use std::error::Error;
use std::fs::File;
use std::time::Instant;

use sudare::dictionary::{write_to_path, SystemDictionaryBuilder};

use clap::Parser;

#[derive(Parser, Debug)]
#[clap(name = "system", about = "Compiles a system dictionary.")]
struct Args {
    /// Lexicon files in the CSV format. They are concatenated in the given order.
    #[clap(short = 'l', long, required = true, multiple_occurrences = true)]
    lexicon_filenames: Vec<String>,

    #[clap(short = 'm', long)]
    matrix_filename: String,

    #[clap(short = 'o', long)]
    output_filename: String,

    #[clap(short = 'd', long, default_value = "")]
    description: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    eprintln!("Compiling the system dictionary...");
    let start = Instant::now();
    let mut lexicons = vec![];
    for filename in &args.lexicon_filenames {
        lexicons.push(File::open(filename)?);
    }
    let bytes = SystemDictionaryBuilder::from_readers(
        lexicons,
        File::open(&args.matrix_filename)?,
        &args.description,
    )?;
    eprintln!("{} seconds", start.elapsed().as_secs_f64());

    eprintln!("Writing the system dictionary...: {}", &args.output_filename);
    write_to_path(&args.output_filename, &bytes)?;
    eprintln!("{} MiB", bytes.len() as f64 / (1024. * 1024.));

    Ok(())
}
