use scaffolder_core::logger::Level;
use scaffolder_core::product::npm_next_steps;
use scaffolder_core::{Answer, InitArgs, Logger, Pipeline, ProductConfig, ScriptedPrompter};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const REGISTRY: &str = r#"
name: lweb-init
version: 0.1.1
boilerplate:
  egg-backend:
    package: boilerplates/egg-backend
    description: egg.js backend service
    category: backend
  react-app:
    package: boilerplates/react-app
    description: react single page application
    category: frontend
"#;

const VARS: &str = r#"
name:
  message: project name
description:
  desc: project description
  default: "{{ name }} web app"
package_name:
  message: npm package name
  default: "@lweb/{{ name }}"
  filter: lowercase
"#;

const PACKAGE_JSON: &str = r#"{
  "name": "{{ package_name }}",
  "description": "{{ description }}",
  "scripts": { "dev": "vite --open \{{ name }}" }
}
"#;

const FAVICON: &[u8] = &[0x00, 0x00, 0x01, 0x00, 0x01, 0x00, b'{', b'{', b'n', b'a', b'm', b'e', b'}', b'}'];

#[derive(Clone)]
struct LwebTestConfig;

impl ProductConfig for LwebTestConfig {
    fn name(&self) -> &'static str {
        "lweb-init-it"
    }

    fn display_name(&self) -> &'static str {
        "lweb-init"
    }

    fn scaffold_prefix(&self) -> &'static str {
        "lweb-"
    }

    fn default_repository_url(&self) -> &'static str {
        "https://gitlab.example.com/boilerplates"
    }

    fn repository_url_env(&self) -> &'static str {
        "LWEB_INIT_IT_REPOSITORY_URL"
    }

    fn registry(&self) -> &'static str {
        REGISTRY
    }

    fn next_steps(&self, dir: &Path, cwd: &Path) -> Vec<String> {
        npm_next_steps(dir, cwd)
    }
}

struct Workspace {
    _root: TempDir,
    cwd: PathBuf,
    templates: PathBuf,
    scratch: PathBuf,
}

fn workspace() -> Workspace {
    let root = TempDir::new().unwrap();
    let cwd = root.path().join("work");
    let templates = root.path().join("templates");
    let app = templates.join("boilerplates/react-app");

    std::fs::create_dir_all(&cwd).unwrap();
    std::fs::create_dir_all(app.join("src")).unwrap();
    std::fs::create_dir_all(app.join("public")).unwrap();
    std::fs::create_dir_all(app.join(".git")).unwrap();

    std::fs::write(app.join("vars.yaml"), VARS).unwrap();
    std::fs::write(app.join("package.json"), PACKAGE_JSON).unwrap();
    std::fs::write(app.join("src/{{ name }}.js"), "export const app = '{{name}}';\n").unwrap();
    std::fs::write(app.join("public/favicon.ico"), FAVICON).unwrap();
    std::fs::write(app.join(".gitignore"), "node_modules\n").unwrap();
    std::fs::write(app.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();

    Workspace {
        cwd,
        templates,
        scratch: root.path().join("scratch"),
        _root: root,
    }
}

fn pipeline<'a>(
    ws: &Workspace,
    config: &'a LwebTestConfig,
    prompter: &'a ScriptedPrompter,
    logger: &Logger,
) -> Pipeline<'a, LwebTestConfig> {
    Pipeline::new(config, prompter, logger.clone())
        .unwrap()
        .with_cwd(&ws.cwd)
        .with_scratch_dir(&ws.scratch)
}

#[tokio::test]
async fn interactive_run_picks_category_and_asks_questions() {
    let ws = workspace();
    let config = LwebTestConfig;
    let prompter = ScriptedPrompter::new([
        Answer::Select(1),
        Answer::Select(0),
        Answer::Text(String::new()),
        Answer::Text("Shop front".to_string()),
        Answer::Text("@LWEB/Shop".to_string()),
    ]);
    let logger = Logger::capture("lweb-init");

    let args = InitArgs {
        directory: Some("lweb-shop".to_string()),
        template_dir: Some(ws.templates.clone()),
        ..Default::default()
    };
    let report = pipeline(&ws, &config, &prompter, &logger)
        .run(&args)
        .await
        .unwrap();

    let asked = prompter.asked();
    assert_eq!(asked[0].message, "Please select a boilerplate category");
    assert_eq!(asked[1].message, "Please select a boilerplate type");
    assert_eq!(asked[2].default.as_deref(), Some("shop"));
    // computed defaults are not offered interactively
    assert_eq!(asked[3].default, None);
    assert_eq!(prompter.remaining(), 0);

    let target = ws.cwd.join("lweb-shop");
    assert_eq!(report.package, "boilerplates/react-app");
    assert_eq!(report.scope["name"], "shop");
    assert_eq!(report.scope["package_name"], "@lweb/shop");

    let package_json = std::fs::read_to_string(target.join("package.json")).unwrap();
    assert!(package_json.contains(r#""name": "@lweb/shop""#));
    assert!(package_json.contains(r#""description": "Shop front""#));
    assert!(package_json.contains(r#""dev": "vite --open {{ name }}""#));

    assert_eq!(
        std::fs::read_to_string(target.join("src/shop.js")).unwrap(),
        "export const app = 'shop';\n"
    );
    assert_eq!(
        std::fs::read(target.join("public/favicon.ico")).unwrap(),
        FAVICON.to_vec()
    );
    assert!(target.join(".gitignore").is_file());
    assert!(!target.join(".git").exists());
    assert!(!target.join("vars.yaml").exists());
    assert_eq!(report.files.len(), 4);

    assert!(logger.contains(Level::Info, "target dir is"));
    assert!(logger.contains(Level::Info, "use boilerplate: react-app(boilerplates/react-app)"));
    assert!(logger.contains(Level::Success, "npm install"));
}

#[tokio::test]
async fn silent_run_with_type_evaluates_computed_defaults() {
    let ws = workspace();
    let config = LwebTestConfig;
    let prompter = ScriptedPrompter::new([]);
    let logger = Logger::capture("lweb-init");

    let args = InitArgs {
        dir: Some("lweb-admin".to_string()),
        boilerplate_type: Some("react-app".to_string()),
        silent: true,
        template_dir: Some(ws.templates.clone()),
        ..Default::default()
    };
    let report = pipeline(&ws, &config, &prompter, &logger)
        .run(&args)
        .await
        .unwrap();

    assert!(prompter.asked().is_empty());
    assert_eq!(report.scope["description"], "admin web app");
    assert_eq!(report.scope["package_name"], "@lweb/admin");
    assert!(ws.cwd.join("lweb-admin/src/admin.js").is_file());
    assert!(logger.contains(Level::Info, "use default due to --silent"));
}

#[tokio::test]
async fn occupied_target_is_reprompted_then_forced_run_overwrites() {
    let ws = workspace();
    let config = LwebTestConfig;
    let occupied = ws.cwd.join("lweb-shop");
    std::fs::create_dir_all(&occupied).unwrap();
    std::fs::write(occupied.join("package.json"), "{}").unwrap();

    let prompter = ScriptedPrompter::new([Answer::Text("lweb-next".to_string())]);
    let logger = Logger::capture("lweb-init");
    let args = InitArgs {
        directory: Some("lweb-shop".to_string()),
        package: Some("boilerplates/react-app".to_string()),
        silent: true,
        template_dir: Some(ws.templates.clone()),
        ..Default::default()
    };
    let report = pipeline(&ws, &config, &prompter, &logger)
        .run(&args)
        .await
        .unwrap();

    assert_eq!(report.target_dir, ws.cwd.join("lweb-next"));
    assert_eq!(report.scope["name"], "next");
    assert!(logger.contains(Level::Error, "already exists and not empty"));
    assert_eq!(
        std::fs::read_to_string(occupied.join("package.json")).unwrap(),
        "{}"
    );

    let forced = ScriptedPrompter::new([]);
    let args = InitArgs {
        force: true,
        ..args
    };
    pipeline(&ws, &config, &forced, &logger)
        .run(&args)
        .await
        .unwrap();

    let package_json = std::fs::read_to_string(occupied.join("package.json")).unwrap();
    assert!(package_json.contains("@lweb/shop"));
    assert!(logger.contains(Level::Warn, "--force"));
}
