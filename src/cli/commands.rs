use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{self, FileFormat};
use crate::cli::args::{Cli, Commands, ConfigCommands, EditCommands, NodePath};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{default_settings_path, Settings};
use crate::domain::{Document, NodeId};
use crate::infrastructure::lts;
use crate::tree_traits::TreeNodeConvert;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::New { file, name }) => _new(file, name),
        Some(Commands::Show { file, json }) => _show(file, *json),
        Some(Commands::Convert { input, output }) => _convert(input, output),
        Some(Commands::Import { input, output }) => _import(input, output.as_deref()),
        Some(Commands::Merge {
            base,
            incoming,
            output,
        }) => _merge(base, incoming, output.as_deref()),
        Some(Commands::Edit { file, command }) => _edit(file, command),
        Some(Commands::Config { command }) => {
            let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
            _config(command, &settings_path)
        }
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage("no command given, see --help".into())),
    }
}

/// Where a document read from `path` is written back: LTS files in place,
/// foreign files next to the original with an `.lts` extension.
fn write_target(path: &Path) -> PathBuf {
    match FileFormat::from_path(path) {
        Ok(FileFormat::Lts) => path.to_path_buf(),
        _ => path.with_extension(lts::EXTENSION),
    }
}

fn resolve(document: &Document, path: &NodePath) -> CliResult<NodeId> {
    document
        .resolve(&path.0)
        .ok_or_else(|| CliError::InvalidArgs(format!("no node at {path}")))
}

#[instrument]
fn _new(file: &Path, name: &str) -> CliResult<()> {
    let mut document = application::new_document();
    document.rename(document.root(), name)?;
    let written = application::save(&document, file)?;
    output::action("Created", &written.display());
    Ok(())
}

#[instrument]
fn _show(file: &Path, json: bool) -> CliResult<()> {
    let document = application::load(file)?;
    if json {
        let record = document.to_record(document.root())?;
        let text = serde_json::to_string_pretty(&record)
            .map_err(|e| CliError::Output(e.to_string()))?;
        output::info(&text);
    } else {
        output::info(&document.to_tree_string());
    }
    Ok(())
}

#[instrument]
fn _convert(input: &Path, output: &Path) -> CliResult<()> {
    let document = application::load(input)?;
    let written = application::save(&document, output)?;
    output::action("Saved", &written.display());
    Ok(())
}

#[instrument]
fn _import(input: &Path, output: Option<&Path>) -> CliResult<()> {
    let document = application::import_foreign(input)?;
    let target = output.map_or_else(|| write_target(input), Path::to_path_buf);
    let written = application::save(&document, &target)?;
    output::success(&format!(
        "imported {} nodes into {}",
        document.node_count() - 1,
        written.display()
    ));
    Ok(())
}

#[instrument]
fn _merge(base: &Path, incoming: &[PathBuf], output: Option<&Path>) -> CliResult<()> {
    let mut document = application::load(base)?;
    for path in incoming {
        let added = application::merge_file(&mut document, path)?;
        output::success(&format!(
            "merged {} top-level nodes from {}",
            added.len(),
            path.display()
        ));
    }
    let target = output.map_or_else(|| write_target(base), Path::to_path_buf);
    let written = application::save(&document, &target)?;
    output::action("Saved", &written.display());
    Ok(())
}

#[instrument]
fn _edit(file: &Path, command: &EditCommands) -> CliResult<()> {
    let mut document = application::load(file)?;
    apply_edit(&mut document, command)?;
    let written = application::save(&document, &write_target(file))?;
    output::action("Saved", &written.display());
    Ok(())
}

pub fn apply_edit(document: &mut Document, command: &EditCommands) -> CliResult<()> {
    debug!("edit: {:?}", command);
    match command {
        EditCommands::Add {
            parent,
            name,
            content,
        } => {
            let parent = resolve(document, parent)?;
            document.add_node(parent, name.as_str(), content.as_str())?;
        }
        EditCommands::Remove { node } => {
            let id = resolve(document, node)?;
            if id == document.root() {
                return Err(CliError::InvalidArgs("the root node cannot be removed".into()));
            }
            document.delete_node(id)?;
        }
        EditCommands::Up { node } => document.move_up(resolve(document, node)?)?,
        EditCommands::Down { node } => document.move_down(resolve(document, node)?)?,
        EditCommands::Indent { node } => document.indent(resolve(document, node)?)?,
        EditCommands::Outdent { node } => document.outdent(resolve(document, node)?)?,
        EditCommands::Rename { node, name } => {
            document.rename(resolve(document, node)?, name.as_str())?
        }
        EditCommands::SetContent { node, content } => {
            document.set_content(resolve(document, node)?, content.as_str())?
        }
        EditCommands::Copy { node, to } => {
            let source = resolve(document, node)?;
            let target = resolve(document, to)?;
            let clip = document.copy(source)?;
            document.graft(target, &clip)?;
        }
        EditCommands::Move { node, to } => {
            let source = resolve(document, node)?;
            let target = resolve(document, to)?;
            if source == document.root()
                || source == target
                || document.is_ancestor(source, target)
            {
                return Err(CliError::InvalidArgs(format!("cannot move {node} under {to}")));
            }
            document.remove_node(source)?;
            document.add_child(target, source)?;
        }
    }
    Ok(())
}

#[instrument]
fn _config(command: &ConfigCommands, settings_path: &Path) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(settings_path);
            output::info(&settings.to_json()?);
        }
        ConfigCommands::Path => output::info(&settings_path.display()),
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
