use crate::core::config::ResolverConfig;
use crate::tools::{InvocationMethod, ToolInvocationPlan, ToolSpec};
use crate::utils::EnvManager;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Maps a logical tool to the ordered list of runnable invocation plans.
///
/// An empty list means the tool is unavailable; resolution itself never fails.
pub trait StrategyResolver: Send + Sync + 'static {
    fn resolve(&self, spec: &ToolSpec, args: &[String]) -> Vec<ToolInvocationPlan>;
}

/// Filesystem-backed resolver trying, in order: a direct executable, an
/// interpreter module, a local script checkout and a shell command with a
/// widened `PATH`.
#[derive(Debug, Clone)]
pub struct PathResolver {
    search_paths: Vec<PathBuf>,
    interpreters: Vec<String>,
    tools_dir: PathBuf,
    extra_path: Vec<PathBuf>,
    shell: PathBuf,
    enable_module: bool,
    enable_scripts: bool,
    enable_shell: bool,
    env: BTreeMap<String, String>,
}

impl PathResolver {
    /// Build from configuration. `env` is attached to every plan.
    pub fn from_config(config: &ResolverConfig, env: BTreeMap<String, String>) -> Self {
        let mut search_paths = config.search_paths.clone();
        if config.include_env_path {
            for dir in EnvManager::inherited_path() {
                if !search_paths.contains(&dir) {
                    search_paths.push(dir);
                }
            }
        }

        Self {
            search_paths,
            interpreters: config.interpreters.clone(),
            tools_dir: config.tools_dir.clone(),
            extra_path: config.extra_path.clone(),
            shell: config.shell.clone(),
            enable_module: config.enable_module,
            enable_scripts: config.enable_scripts,
            enable_shell: config.enable_shell,
            env,
        }
    }

    fn find_on(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
        let candidate = Path::new(name);
        if candidate.components().count() > 1 {
            return is_executable(candidate).then(|| candidate.to_path_buf());
        }
        dirs.iter()
            .map(|dir| dir.join(name))
            .find(|path| is_executable(path))
    }

    fn interpreter(&self) -> Option<PathBuf> {
        self.interpreters
            .iter()
            .find_map(|name| Self::find_on(&self.search_paths, name))
    }

    fn plan(&self, method: InvocationMethod, program: PathBuf, args: Vec<String>) -> ToolInvocationPlan {
        ToolInvocationPlan::new(method, program, args).with_env(self.env.clone())
    }

    fn direct_plans(&self, spec: &ToolSpec, args: &[String]) -> Vec<ToolInvocationPlan> {
        spec.binaries
            .iter()
            .filter_map(|name| Self::find_on(&self.search_paths, name))
            .map(|program| self.plan(InvocationMethod::DirectBinary, program, args.to_vec()))
            .collect()
    }

    fn module_plans(&self, spec: &ToolSpec, args: &[String], interpreter: &Path) -> Vec<ToolInvocationPlan> {
        spec.modules
            .iter()
            .map(|module| {
                let mut full = vec!["-m".to_string(), module.clone()];
                full.extend_from_slice(args);
                self.plan(InvocationMethod::Module, interpreter.to_path_buf(), full)
            })
            .collect()
    }

    fn script_plan(&self, spec: &ToolSpec, args: &[String], interpreter: &Path) -> Option<ToolInvocationPlan> {
        let script = spec
            .scripts
            .iter()
            .map(|rel| self.tools_dir.join(rel))
            .find(|path| path.is_file())?;
        let script = script.canonicalize().unwrap_or(script);

        let mut full = vec![script.display().to_string()];
        full.extend_from_slice(args);
        let mut plan = self.plan(InvocationMethod::LocalScript, interpreter.to_path_buf(), full);
        if let Some(dir) = script.parent() {
            plan = plan.with_cwd(dir);
        }
        Some(plan)
    }

    fn shell_plan(&self, spec: &ToolSpec, args: &[String]) -> Option<ToolInvocationPlan> {
        if !is_executable(&self.shell) {
            return None;
        }
        let widened = EnvManager::widened_path_entries(&self.extra_path);
        let binary = spec
            .binaries
            .iter()
            .find(|name| Self::find_on(&widened, name).is_some())?;

        let words = std::iter::once(binary.as_str()).chain(args.iter().map(String::as_str));
        let command = match shlex::try_join(words) {
            Ok(command) => command,
            Err(err) => {
                tracing::warn!(tool = %spec.id, "cannot quote shell command: {}", err);
                return None;
            }
        };

        let mut plan = self.plan(
            InvocationMethod::Shell,
            self.shell.clone(),
            vec!["-c".to_string(), command],
        );
        plan.env
            .insert("PATH".to_string(), EnvManager::widened_path(&self.extra_path));
        Some(plan)
    }
}

impl StrategyResolver for PathResolver {
    fn resolve(&self, spec: &ToolSpec, args: &[String]) -> Vec<ToolInvocationPlan> {
        let mut plans = self.direct_plans(spec, args);

        let interpreter = if self.enable_module || self.enable_scripts {
            self.interpreter()
        } else {
            None
        };
        if let Some(interpreter) = &interpreter {
            if self.enable_module {
                plans.extend(self.module_plans(spec, args, interpreter));
            }
            if self.enable_scripts {
                plans.extend(self.script_plan(spec, args, interpreter));
            }
        }

        if self.enable_shell {
            plans.extend(self.shell_plan(spec, args));
        }

        tracing::debug!(
            tool = %spec.id,
            candidates = plans.len(),
            methods = ?plans.iter().map(|p| p.method).collect::<Vec<_>>(),
            "resolved invocation plans"
        );
        plans
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
