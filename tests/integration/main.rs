//! Integration tests for windcache

mod support {
    use async_trait::async_trait;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use windcache::toolchain::{
        CompileOptions, Compiler, Features, OptimizeOptions, Optimized, Optimizer, RootSource,
        Scanner, ScannerFactory, SourceEntry, SourceMap, Stylesheet, Toolchain,
    };
    use windcache::{WindcacheError, WindcacheResult};

    /// Understands a handful of directives, enough to drive the cache
    #[derive(Default)]
    pub struct LineCompiler {
        pub compiles: AtomicUsize,
    }

    #[async_trait]
    impl Compiler for LineCompiler {
        async fn compile(
            &self,
            content: &str,
            options: CompileOptions<'_>,
        ) -> WindcacheResult<Box<dyn Stylesheet>> {
            self.compiles.fetch_add(1, Ordering::SeqCst);

            let mut sheet = LineStylesheet::default();
            for line in content.lines().map(str::trim) {
                if line == "@tailwind utilities;" {
                    sheet.features |= Features::UTILITIES;
                } else if line.starts_with("@apply") || line.contains(" @apply ") {
                    sheet.features |= Features::AT_APPLY;
                } else if line.contains("theme(") {
                    sheet.features |= Features::THEME_FUNCTION;
                } else if let Some(import) = quoted(line, "@import") {
                    sheet.features |= Features::AT_IMPORT;
                    (options.on_dependency)(&options.base.join(import));
                } else if line == "@source none;" {
                    sheet.root = RootSource::None;
                } else if let Some(dir) = quoted(line, "@source") {
                    sheet.sources.push(SourceEntry::new(dir, "**/*"));
                } else if line.starts_with("@error") {
                    return Err(WindcacheError::compile(
                        options.from.unwrap_or("<input>"),
                        line,
                    ));
                } else {
                    sheet.passthrough.push_str(line);
                    sheet.passthrough.push('\n');
                }
            }
            Ok(Box::new(sheet))
        }
    }

    fn quoted<'a>(line: &'a str, directive: &str) -> Option<&'a str> {
        let rest = line.strip_prefix(directive)?.trim();
        rest.strip_prefix('"')?.split('"').next()
    }

    #[derive(Default)]
    struct LineStylesheet {
        features: Features,
        root: RootSource,
        sources: Vec<SourceEntry>,
        passthrough: String,
    }

    impl Stylesheet for LineStylesheet {
        fn features(&self) -> Features {
            self.features
        }

        fn root(&self) -> &RootSource {
            &self.root
        }

        fn sources(&self) -> &[SourceEntry] {
            &self.sources
        }

        fn build(&mut self, candidates: &[String]) -> WindcacheResult<String> {
            let mut css = self.passthrough.clone();
            for candidate in candidates {
                let declaration = match candidate.as_str() {
                    "flex" => "display: flex;",
                    "grid" => "display: grid;",
                    "px-4" => "padding-inline: 1rem;",
                    "underline" => "text-decoration-line: underline;",
                    _ => continue,
                };
                css.push_str(&format!(".{} {{ {} }}\n", candidate, declaration));
            }
            Ok(css)
        }

        fn build_source_map(&self) -> WindcacheResult<SourceMap> {
            Ok(SourceMap::new(vec!["input.css".to_string()]))
        }
    }

    /// Reads `class="..."` attributes from `.html` files under each source
    #[derive(Default)]
    pub struct HtmlScanners {
        pub created: parking_lot::Mutex<Vec<Vec<SourceEntry>>>,
    }

    impl ScannerFactory for HtmlScanners {
        fn create(&self, sources: Vec<SourceEntry>) -> WindcacheResult<Box<dyn Scanner>> {
            self.created.lock().push(sources.clone());
            Ok(Box::new(HtmlScanner { sources }))
        }
    }

    struct HtmlScanner {
        sources: Vec<SourceEntry>,
    }

    impl Scanner for HtmlScanner {
        fn scan(&mut self) -> WindcacheResult<Vec<String>> {
            let mut candidates = Vec::new();
            for source in self.sources.iter().filter(|s| !s.negated) {
                for file in html_files(&source.base) {
                    let text = fs::read_to_string(&file)
                        .map_err(|e| WindcacheError::Scan(e.to_string()))?;
                    for attr in text.split("class=\"").skip(1) {
                        let value = attr.split('"').next().unwrap_or_default();
                        candidates.extend(value.split_whitespace().map(str::to_string));
                    }
                }
            }
            Ok(candidates)
        }
    }

    fn html_files(dir: &Path) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut files = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(html_files(&path));
            } else if path.extension().is_some_and(|e| e == "html") {
                files.push(path);
            }
        }
        files.sort();
        files
    }

    /// Strips newlines when minifying
    #[derive(Default)]
    pub struct NewlineOptimizer {
        pub calls: AtomicUsize,
    }

    impl Optimizer for NewlineOptimizer {
        fn optimize(&self, code: &str, options: OptimizeOptions<'_>) -> WindcacheResult<Optimized> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let code = if options.minify {
                code.replace('\n', "")
            } else {
                code.to_string()
            };
            Ok(Optimized { code, map: None })
        }
    }

    pub struct Harness {
        pub compiler: Arc<LineCompiler>,
        pub scanners: Arc<HtmlScanners>,
        pub optimizer: Arc<NewlineOptimizer>,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                compiler: Arc::new(LineCompiler::default()),
                scanners: Arc::new(HtmlScanners::default()),
                optimizer: Arc::new(NewlineOptimizer::default()),
            }
        }

        pub fn toolchain(&self) -> Toolchain {
            Toolchain::new(self.compiler.clone(), self.scanners.clone())
        }

        pub fn compiles(&self) -> usize {
            self.compiler.compiles.load(Ordering::SeqCst)
        }
    }

    pub fn touch(path: &Path) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(std::time::SystemTime::now() + std::time::Duration::from_secs(60))
            .unwrap();
    }
}

mod plugin_tests {
    use super::support::{touch, Harness};
    use std::fs;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tempfile::TempDir;
    use windcache::config::{OptimizeSetting, PluginOptions};
    use windcache::toolchain::SourceEntry;
    use windcache::{LoadResult, Loader, TailwindPlugin, WindcacheError};

    fn unoptimized() -> PluginOptions {
        PluginOptions {
            optimize: OptimizeSetting::Enabled(false),
            ..Default::default()
        }
    }

    fn plugin(harness: &Harness, options: &PluginOptions, dir: &TempDir) -> TailwindPlugin {
        TailwindPlugin::with_cwd(
            options,
            harness.toolchain(),
            harness.optimizer.clone(),
            dir.path().to_path_buf(),
        )
    }

    #[tokio::test]
    async fn plain_css_passes_through() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new();
        let plugin = plugin(&harness, &PluginOptions::default(), &dir);
        let css = "a { color: red; }\n";
        fs::write(dir.path().join("a.css"), css).unwrap();

        let result = plugin.on_load("a.css").await.unwrap().unwrap();

        assert_eq!(result, LoadResult::passthrough(css.to_string()));
        assert!(plugin.registry().is_empty());
        assert_eq!(harness.optimizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn new_usage_in_scanned_file_is_picked_up() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new();
        let plugin = plugin(&harness, &unoptimized(), &dir);
        fs::write(dir.path().join("b.css"), "@tailwind utilities;\n").unwrap();
        fs::write(dir.path().join("index.html"), r#"<div class="flex"></div>"#).unwrap();

        let first = plugin.on_load("b.css").await.unwrap().unwrap();
        assert!(first.contents.contains(".flex { display: flex; }"));
        assert!(!first.contents.contains("px-4"));

        fs::write(
            dir.path().join("index.html"),
            r#"<div class="flex px-4"></div>"#,
        )
        .unwrap();
        let second = plugin.on_load("b.css").await.unwrap().unwrap();

        assert!(second.contents.contains(".flex { display: flex; }"));
        assert!(second.contents.contains(".px-4 { padding-inline: 1rem; }"));
        assert_eq!(second.loader, Loader::Css);
        assert_eq!(second.resolve_dir, Some(dir.path().to_path_buf()));
        assert_eq!(harness.compiles(), 1);
    }

    #[tokio::test]
    async fn removed_usage_keeps_its_rule() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new();
        let plugin = plugin(&harness, &unoptimized(), &dir);
        fs::write(dir.path().join("app.css"), "@tailwind utilities;\n").unwrap();
        fs::write(dir.path().join("index.html"), r#"<p class="underline">"#).unwrap();

        plugin.on_load("app.css").await.unwrap();
        fs::write(dir.path().join("index.html"), r#"<p class="grid">"#).unwrap();
        let result = plugin.on_load("app.css").await.unwrap().unwrap();

        assert!(result.contents.contains(".underline"));
        assert!(result.contents.contains(".grid"));
    }

    #[tokio::test]
    async fn editing_an_import_rebuilds() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new();
        let plugin = plugin(&harness, &unoptimized(), &dir);
        fs::write(
            dir.path().join("app.css"),
            "@import \"theme.css\";\n@tailwind utilities;\n",
        )
        .unwrap();
        fs::write(dir.path().join("theme.css"), ":root { --brand: red; }").unwrap();

        plugin.on_load("app.css").await.unwrap();
        plugin.on_load("app.css").await.unwrap();
        assert_eq!(harness.compiles(), 1);

        touch(&dir.path().join("theme.css"));
        plugin.on_load("app.css").await.unwrap();
        assert_eq!(harness.compiles(), 2);
        assert_eq!(harness.scanners.created.lock().len(), 2);

        plugin.on_load("app.css").await.unwrap();
        assert_eq!(harness.compiles(), 2);
    }

    #[tokio::test]
    async fn missing_import_rebuilds_until_it_exists() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new();
        let plugin = plugin(&harness, &unoptimized(), &dir);
        fs::write(
            dir.path().join("app.css"),
            "@import \"later.css\";\n@tailwind utilities;\n",
        )
        .unwrap();

        plugin.on_load("app.css").await.unwrap();
        plugin.on_load("app.css").await.unwrap();
        assert_eq!(harness.compiles(), 2);

        fs::write(dir.path().join("later.css"), "").unwrap();
        plugin.on_load("app.css").await.unwrap();
        plugin.on_load("app.css").await.unwrap();
        assert_eq!(harness.compiles(), 3);
    }

    #[tokio::test]
    async fn scanner_sources_follow_precedence() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new();
        let options = PluginOptions {
            sources: vec![SourceEntry::new("/shared/ui", "**/*.html")],
            ..unoptimized()
        };
        let plugin = plugin(&harness, &options, &dir);
        fs::write(
            dir.path().join("app.css"),
            "@tailwind utilities;\n@source \"/vendor\";\n",
        )
        .unwrap();

        plugin.on_load("app.css").await.unwrap();

        let created = harness.scanners.created.lock();
        assert_eq!(
            created[0],
            vec![
                SourceEntry::new(dir.path(), "**/*"),
                SourceEntry::new("/shared/ui", "**/*.html"),
                SourceEntry::new(dir.path(), "**/*"),
            ]
        );
    }

    #[tokio::test]
    async fn source_none_disables_detection() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new();
        let plugin = plugin(&harness, &unoptimized(), &dir);
        fs::write(
            dir.path().join("app.css"),
            "@source none;\n@tailwind utilities;\n",
        )
        .unwrap();
        fs::write(dir.path().join("index.html"), r#"<div class="flex">"#).unwrap();

        let result = plugin.on_load("app.css").await.unwrap().unwrap();

        assert!(!result.contents.contains(".flex"));
        assert!(harness.scanners.created.lock()[0].is_empty());
    }

    #[tokio::test]
    async fn optimizer_minifies_by_default() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new();
        let plugin = plugin(&harness, &PluginOptions::default(), &dir);
        fs::write(dir.path().join("app.css"), "@tailwind utilities;\n").unwrap();
        fs::write(dir.path().join("index.html"), r#"<div class="flex grid">"#).unwrap();

        let result = plugin.on_load("app.css").await.unwrap().unwrap();

        assert!(!result.contents.contains('\n'));
        assert!(result.contents.contains(".grid"));
        assert_eq!(harness.optimizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn compile_error_fails_the_load() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new();
        let plugin = plugin(&harness, &unoptimized(), &dir);
        fs::write(dir.path().join("app.css"), "@tailwind utilities;\n").unwrap();
        plugin.on_load("app.css").await.unwrap();

        fs::write(
            dir.path().join("app.css"),
            "@tailwind utilities;\n@error \"broken\";\n",
        )
        .unwrap();
        touch(&dir.path().join("app.css"));
        let err = plugin.on_load("app.css").await.unwrap_err();
        assert!(matches!(err, WindcacheError::Compile { .. }));

        fs::write(dir.path().join("app.css"), "@tailwind utilities;\n").unwrap();
        touch(&dir.path().join("app.css"));
        assert!(plugin.on_load("app.css").await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_loads_of_many_files() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new();
        let plugin = Arc::new(plugin(&harness, &unoptimized(), &dir));
        fs::write(dir.path().join("index.html"), r#"<div class="flex">"#).unwrap();
        for i in 0..8 {
            fs::write(dir.path().join(format!("s{}.css", i)), "@tailwind utilities;\n").unwrap();
        }
        fs::write(dir.path().join("plain.css"), "a {}\n").unwrap();

        let mut tasks = Vec::new();
        for name in (0..8)
            .map(|i| format!("s{}.css", i))
            .chain(["s0.css".to_string(), "plain.css".to_string()])
        {
            let plugin = Arc::clone(&plugin);
            tasks.push(tokio::spawn(async move { plugin.on_load(&name).await }));
        }

        for result in futures_util::future::join_all(tasks).await {
            assert!(result.unwrap().unwrap().is_some());
        }

        assert_eq!(plugin.registry().len(), 8);
        assert_eq!(harness.compiles(), 9);
    }
}

mod config_tests {
    use std::fs;
    use tempfile::TempDir;
    use windcache::config::{ConfigManager, LOCAL_CONFIG_FILE};

    #[tokio::test]
    async fn project_config_is_discovered_and_loaded() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(LOCAL_CONFIG_FILE),
            r#"
                optimize = { minify = false }

                [base]
                pattern = "src/**/*"
            "#,
        )
        .unwrap();
        let nested = dir.path().join("web");
        fs::create_dir_all(&nested).unwrap();

        let options = ConfigManager::discover(&nested).load().await.unwrap();

        assert!(options.optimize.should_optimize());
        assert!(!options.optimize.minify());
        assert_eq!(options.base.pattern.as_deref(), Some("src/**/*"));
    }
}
