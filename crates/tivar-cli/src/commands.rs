//! Command implementations.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, info_span};

use tivar_cli::report::{
    FileReport, ModelReport, TextReport, diagnostic_lines, diagnostics_table, entries_table,
    header_table, models_table,
};
use tivar_format::tokenized;
use tivar_format::{
    Diagnostics, Entry, EntryKind, EntryOptions, Header, HeaderOptions, ReadOptions, Section, TiVar,
    VarReader, VarWriter,
};
use tivar_standards::{
    BuiltinCatalog, BuiltinTokens, Model, ModelCatalog, TokenTable, tokens::load_table_from_path,
};

use crate::cli::{DecodeArgs, EncodeArgs, ExtractArgs, InspectArgs, SessionArgs};

/// Options resolved once per invocation.
pub struct Session {
    model: Option<&'static Model>,
    tokens: Option<TokenTable>,
    strict: bool,
    json: bool,
}

impl Session {
    pub fn from_args(args: &SessionArgs) -> Result<Self> {
        let model = args
            .model
            .as_deref()
            .map(|name| BuiltinCatalog.find(name))
            .transpose()
            .context("resolve --model")?;
        let tokens = args
            .tokens
            .as_deref()
            .map(load_table_from_path)
            .transpose()
            .context("load --tokens")?;
        if let Some(table) = &tokens {
            info!(tokens = table.len(), "loaded token table");
        }
        Ok(Self {
            model,
            tokens,
            strict: args.strict,
            json: args.json,
        })
    }

    fn read_options(&self) -> ReadOptions {
        let options = ReadOptions::new();
        let options = match self.model {
            Some(model) => options.expected_model(model),
            None => options,
        };
        if self.strict { options.strict() } else { options }
    }

    /// Token table: `--tokens`, else the built-in table of `--model`, else
    /// of `fallback`, else of the default model.
    fn table(&self, fallback: Option<&'static Model>) -> Result<&TokenTable> {
        if let Some(table) = &self.tokens {
            return Ok(table);
        }
        let model = self
            .model
            .or(fallback)
            .unwrap_or(HeaderOptions::default().model);
        Ok(tokenized::table_for(&BuiltinTokens, model)?)
    }

    /// Model used for new files.
    fn target_model(&self) -> &'static Model {
        self.model.unwrap_or(HeaderOptions::default().model)
    }

    /// Print lenient-mode diagnostics to stderr.
    fn warn(&self, diagnostics: &Diagnostics) {
        if !diagnostics.is_empty() {
            eprintln!("{}", diagnostic_lines(diagnostics));
        }
    }

    fn print_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("serialize report")?
        );
        Ok(())
    }
}

pub fn run_inspect(session: &Session, args: &InspectArgs) -> Result<()> {
    let span = info_span!("inspect", file = %args.file.display());
    let _guard = span.enter();

    let (var, diagnostics) = read_var(session, &args.file)?;
    let report = FileReport::new(args.file.display().to_string(), &var, diagnostics);
    if session.json {
        return session.print_json(&report);
    }
    println!("{}", header_table(&report));
    println!("{}", entries_table(&report.entries));
    if !report.diagnostics.is_empty() {
        println!();
        println!("Diagnostics:");
        println!("{}", diagnostics_table(&report.diagnostics));
    }
    Ok(())
}

pub fn run_decode(session: &Session, args: &DecodeArgs) -> Result<()> {
    let span = info_span!("decode", file = %args.file.display());
    let _guard = span.enter();

    let (entries, model, mut diagnostics) = match args.entry {
        Some(index) => {
            let bytes = read_file(&args.file)?;
            let (entry, found) = VarReader::with_options(bytes.as_slice(), session.read_options())
                .read_entry(index)
                .with_context(|| format!("read entry {index} of {}", args.file.display()))?
                .into_parts();
            let model = Header::from_bytes(&bytes)
                .value
                .derive_model(&BuiltinCatalog)
                .value;
            (vec![(index, entry)], model, found)
        }
        None => {
            let (var, found) = read_var(session, &args.file)?;
            let model = var.model();
            (var.entries().iter().cloned().enumerate().collect(), model, found)
        }
    };
    let table = session.table(model)?;

    let mut texts = Vec::new();
    for (index, entry) in entries {
        if !entry.kind().is_tokenized() {
            info!(index, kind = %entry.kind(), "skipping entry without text");
            continue;
        }
        let (text, found) = entry.string(table)?.into_parts();
        diagnostics.extend_for_entry(index, found);
        texts.push(TextReport {
            index,
            name: entry.name(),
            kind: entry.kind(),
            text,
            diagnostics: Diagnostics::new(),
        });
    }
    if session.strict {
        diagnostics.clone().into_result()?;
    }

    if session.json {
        for report in &mut texts {
            report.diagnostics = entry_diagnostics(&diagnostics, report.index);
        }
        return session.print_json(&texts);
    }
    session.warn(&diagnostics);
    match texts.as_slice() {
        [single] => println!("{}", single.text),
        many => {
            for report in many {
                println!("# {} {} ({})", report.index, report.name, report.kind);
                println!("{}", report.text);
            }
        }
    }
    Ok(())
}

pub fn run_encode(session: &Session, args: &EncodeArgs) -> Result<()> {
    let model = session.target_model();
    let kind = EntryKind::from(args.kind);
    let text = read_text(&args.input)?;

    let mut options = EntryOptions::for_model(model);
    if let Some(name) = &args.name {
        options = options.name(name);
    }
    if args.archived {
        options = options.archived(true);
    }
    let (mut entry, mut diagnostics) = Entry::new(kind, options).into_parts();
    entry
        .load_string(text.trim_end_matches(['\r', '\n']), session.table(Some(model))?)
        .with_context(|| format!("tokenize {}", args.input.display()))?;

    let mut header_options = HeaderOptions::new().model(model);
    if let Some(comment) = &args.comment {
        header_options = header_options.comment(comment);
    }
    let (var, found) = entry
        .export(Some(Header::new(&header_options)), Some(model))
        .into_parts();
    diagnostics.extend(found);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(Path::new("."), &var));
    finish_write(session, &var, &output, &diagnostics)
}

pub fn run_extract(session: &Session, args: &ExtractArgs) -> Result<()> {
    let span = info_span!("extract", file = %args.file.display(), entry = args.entry);
    let _guard = span.enter();

    let bytes = read_file(&args.file)?;
    let (entry, mut diagnostics) =
        VarReader::with_options(bytes.as_slice(), session.read_options())
            .read_entry(args.entry)
            .with_context(|| format!("read entry {} of {}", args.entry, args.file.display()))?
            .into_parts();

    let header = Header::from_bytes(&bytes).value;
    let model = session
        .model
        .or_else(|| header.derive_model(&BuiltinCatalog).value);
    let (var, found) = entry.export(Some(header), model).into_parts();
    diagnostics.extend(found);

    let output = args.output.clone().unwrap_or_else(|| {
        let dir = args.file.parent().unwrap_or(Path::new("."));
        default_output(dir, &var)
    });
    finish_write(session, &var, &output, &diagnostics)
}

pub fn run_models(session: &Session) -> Result<()> {
    let models: Vec<ModelReport> = BuiltinCatalog
        .models()
        .iter()
        .copied()
        .map(ModelReport::from)
        .collect();
    if session.json {
        return session.print_json(&models);
    }
    println!("{}", models_table(&models));
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read {}", path.display()))
}

fn read_var(session: &Session, path: &Path) -> Result<(TiVar, Diagnostics)> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let parsed = VarReader::with_options(file, session.read_options())
        .read_var()
        .with_context(|| format!("read {}", path.display()))?;
    info!(
        entries = parsed.value.entries().len(),
        diagnostics = parsed.diagnostics.len(),
        "read variable file"
    );
    Ok(parsed.into_parts())
}

fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// `<NAME>.<EXTENSION>` in `dir`, named after the only entry.
fn default_output(dir: &Path, var: &TiVar) -> PathBuf {
    let stem = var
        .entries()
        .first()
        .map(Entry::name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "UNNAMED".to_string());
    dir.join(format!("{stem}.{}", var.extension().value))
}

fn entry_diagnostics(diagnostics: &Diagnostics, index: usize) -> Diagnostics {
    let mut found = Diagnostics::new();
    for diagnostic in diagnostics {
        if diagnostic.location.section == Section::Entry(index) {
            found.push(diagnostic.clone());
        }
    }
    found
}

fn finish_write(
    session: &Session,
    var: &TiVar,
    output: &Path,
    diagnostics: &Diagnostics,
) -> Result<()> {
    if session.strict {
        diagnostics.clone().into_result()?;
    }
    let file = File::create(output).with_context(|| format!("create {}", output.display()))?;
    VarWriter::new(file)
        .write_var(var)
        .with_context(|| format!("write {}", output.display()))?;
    info!(path = %output.display(), bytes = var.length(), "wrote variable file");

    if session.json {
        let report = FileReport::new(output.display().to_string(), var, diagnostics.clone());
        return session.print_json(&report);
    }
    session.warn(diagnostics);
    println!("{}", output.display());
    Ok(())
}
