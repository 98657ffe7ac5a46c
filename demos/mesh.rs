//! Converts JSON document of SVG elements into batched vertex buffers
//!
//! Document is either a list of elements or an object `{"options": {..}, "elements": [..]}`,
//! for example `[{"type": "path", "d": "M0,0 L10,0 L10,10 Z", "style": "fill:red"}]`.
use std::{
    env,
    fs::File,
    io::{BufWriter, Read, Write},
};
use svgmesh::*;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

type Error = Box<dyn std::error::Error>;

#[derive(Debug)]
struct Args {
    input_file: String,
    output_file: Option<String>,
    anomalies: bool,
}

impl Args {
    fn parse() -> Result<Args, Error> {
        let mut result = Args {
            input_file: String::new(),
            output_file: None,
            anomalies: false,
        };
        let mut positional = 0;
        let mut args = env::args();
        let cmd = args.next().unwrap_or_else(|| "mesh".to_owned());
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-h" => {
                    positional = 0;
                    break;
                }
                "-o" => {
                    result.output_file = Some(args.next().ok_or("-o requires argument")?);
                }
                "-a" => {
                    result.anomalies = true;
                }
                _ => {
                    positional += 1;
                    match positional {
                        1 => result.input_file = arg,
                        _ => return Err("unexpected positional argment".into()),
                    }
                }
            }
        }
        if positional < 1 {
            eprintln!("Converts JSON document of SVG elements into batched vertex buffers");
            eprintln!("\nUSAGE:");
            eprintln!("    {} [-o <out.bin>] [-a] <document.json>", cmd);
            eprintln!("\nARGS:");
            eprintln!("    -o <out.bin>       write fill and stroke buffers as raw f32 values");
            eprintln!("    -a                 print collected anomalies");
            eprintln!("    <document.json>    file containing document ('-' means stdin)");
            std::process::exit(1);
        }
        Ok(result)
    }
}

fn document_load(path: &str, diag: &mut impl Diagnostics) -> Result<Document, Error> {
    let mut contents = String::new();
    if path != "-" {
        let mut file = File::open(path)?;
        file.read_to_string(&mut contents)?;
    } else {
        std::io::stdin().read_to_string(&mut contents)?;
    }
    Ok(Document::from_json(&contents, diag)?)
}

/// Logs every anomaly and keeps a copy of it
#[derive(Default)]
struct Collect {
    anomalies: Vec<Anomaly>,
}

impl Diagnostics for Collect {
    fn report(&mut self, anomaly: Anomaly) {
        TracingDiagnostics.report(anomaly.clone());
        self.anomalies.push(anomaly);
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse()?;
    let mut diag = Collect::default();
    let mut doc = document_load(&args.input_file, &mut diag)?;
    tracing::debug!("[document:shapes] {}", doc.len());
    let batch = doc.finish(&mut diag);

    println!("shapes: {}", doc.len());
    if let Some(bbox) = doc.bbox() {
        println!("bbox: {:?}", bbox);
    }
    println!("fill vertices: {}", batch.fill_vertex_count());
    println!("stroke vertices: {}", batch.stroke_vertex_count());
    println!("anomalies: {}", diag.anomalies.len());
    if args.anomalies {
        for anomaly in diag.anomalies.iter() {
            println!("    {:?}: {}", anomaly.kind(), anomaly);
        }
    }

    if let Some(output_file) = args.output_file {
        let save = tracing::debug_span!("[save]");
        save.in_scope(|| -> Result<(), Error> {
            let mut output = BufWriter::new(File::create(output_file)?);
            output.write_all(batch.fill_bytes())?;
            output.write_all(batch.stroke_bytes())?;
            output.flush()?;
            Ok(())
        })?;
    }
    Ok(())
}
