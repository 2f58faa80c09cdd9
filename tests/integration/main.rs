//! Integration tests for cordova-agent

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn agent() -> Command {
        cargo_bin_cmd!("cordova-agent")
    }

    #[test]
    fn help_displays() {
        agent()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("CI build-agent tasks"));
    }

    #[test]
    fn version_displays() {
        agent()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cordova-agent"));
    }

    #[test]
    fn cordova_requires_command_input() {
        agent()
            .arg("cordova")
            .env_remove("INPUT_CORDOVACOMMAND")
            .env_remove("INPUT_CWD")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Missing required input: cordovaCommand"));
    }

    #[test]
    fn ionic_requires_command_input() {
        agent()
            .arg("ionic")
            .env_remove("INPUT_IONICCOMMAND")
            .env_remove("INPUT_CWD")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Missing required input: ionicCommand"));
    }

    #[test]
    fn build_requires_platform_input() {
        agent()
            .args(["build"])
            .env_remove("INPUT_PLATFORM")
            .env_remove("INPUT_CWD")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Missing required input: platform"));
    }

    #[test]
    fn nonexistent_cwd_fails() {
        agent()
            .args(["--cwd", "/nonexistent/project/path", "cordova", "--command", "build"])
            .assert()
            .failure()
            .code(1);
    }
}

#[cfg(unix)]
mod task_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    fn agent() -> Command {
        cargo_bin_cmd!("cordova-agent")
    }

    /// Seed a cache entry whose `.bin/<tool>` shim is a shell script
    fn seed_cached_tool(cache_root: &Path, version: &str, tool: &str, script: &str) {
        let node_modules = cache_root.join(version).join("node_modules");
        fs::create_dir_all(node_modules.join(tool)).unwrap();
        let bin_dir = node_modules.join(".bin");
        fs::create_dir_all(&bin_dir).unwrap();
        let bin = bin_dir.join(tool);
        fs::write(&bin, script).unwrap();
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn cordova_task_runs_cached_cli_with_verbatim_args() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        let project = temp.path().join("project");
        fs::create_dir_all(&project).unwrap();
        seed_cached_tool(
            &cache,
            "6.3.0",
            "cordova",
            "#!/bin/sh\necho \"cordova invoked: $@\"\nexit 0\n",
        );

        agent()
            .args([
                "cordova",
                "--command",
                "build",
                "--args",
                "--release",
                "--cordova-version",
                "6.3.0",
            ])
            .env("CORDOVA_CACHE", &cache)
            .env("INPUT_CWD", &project)
            .assert()
            .success()
            .stdout(predicate::str::contains("cordova invoked: build --release"));
    }

    #[test]
    fn cordova_task_propagates_child_exit_code() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        let project = temp.path().join("project");
        fs::create_dir_all(&project).unwrap();
        seed_cached_tool(&cache, "6.3.0", "cordova", "#!/bin/sh\nexit 7\n");

        agent()
            .args(["cordova", "--command", "build", "--cordova-version", "6.3.0"])
            .env("CORDOVA_CACHE", &cache)
            .env("INPUT_CWD", &project)
            .assert()
            .failure()
            .code(7);
    }

    #[test]
    fn cordova_task_resolves_version_from_taco_json() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        let project = temp.path().join("project");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("taco.json"), r#"{"cordova-cli": "5.1.1"}"#).unwrap();
        seed_cached_tool(
            &cache,
            "5.1.1",
            "cordova",
            "#!/bin/sh\necho \"pinned cordova ran\"\nexit 0\n",
        );

        agent()
            .args(["cordova", "--command", "prepare"])
            .env("CORDOVA_CACHE", &cache)
            .env("INPUT_CWD", &project)
            .env_remove("INPUT_CORDOVAVERSION")
            .assert()
            .success()
            .stdout(predicate::str::contains("pinned cordova ran"));
    }

    #[test]
    fn ionic_task_sees_cordova_on_path() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        let project = temp.path().join("project");
        fs::create_dir_all(&project).unwrap();
        seed_cached_tool(&cache, "6.3.0", "cordova", "#!/bin/sh\nexit 0\n");
        seed_cached_tool(
            &cache,
            "1.7.16",
            "ionic",
            "#!/bin/sh\ncommand -v cordova >/dev/null && echo \"cordova on PATH\"\necho \"ionic invoked: $@\"\n",
        );

        agent()
            .args([
                "ionic",
                "--command",
                "build",
                "--cordova-version",
                "6.3.0",
                "--ionic-version",
                "1.7.16",
            ])
            .env("CORDOVA_CACHE", &cache)
            .env("INPUT_CWD", &project)
            .assert()
            .success()
            .stdout(predicate::str::contains("cordova on PATH"))
            .stdout(predicate::str::contains("ionic invoked: build"));
    }

    #[test]
    fn build_task_adds_missing_platform_then_builds() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        let project = temp.path().join("project");
        // Support plugin already present, so no plugin add is attempted
        fs::create_dir_all(project.join("plugins").join("cordova-plugin-build-support")).unwrap();
        fs::create_dir_all(project.join("platforms").join("android")).unwrap();
        seed_cached_tool(
            &cache,
            "6.3.0",
            "cordova",
            "#!/bin/sh\necho \"cordova invoked: $@\"\nexit 0\n",
        );

        let assert = agent()
            .args([
                "build",
                "--platform",
                "ios,android",
                "--args",
                "--release",
                "--cordova-version",
                "6.3.0",
            ])
            .env("CORDOVA_CACHE", &cache)
            .env("INPUT_CWD", &project)
            .assert()
            .success()
            .stdout(predicate::str::contains("cordova invoked: platform add ios"))
            .stdout(predicate::str::contains("cordova invoked: build ios --release"))
            .stdout(predicate::str::contains("cordova invoked: build android --release"))
            .stdout(predicate::str::contains("plugin add").not());

        // android was already present, so only ios got added
        let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
        assert!(!stdout.contains("platform add android"));
    }

    #[test]
    fn build_task_adds_support_plugin_when_missing() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        let project = temp.path().join("project");
        let plugin_src = temp.path().join("support-plugin-src");
        fs::create_dir_all(project.join("platforms").join("android")).unwrap();
        fs::create_dir_all(&plugin_src).unwrap();
        seed_cached_tool(
            &cache,
            "6.3.0",
            "cordova",
            "#!/bin/sh\necho \"cordova invoked: $@\"\nexit 0\n",
        );

        let assert = agent()
            .args(["build", "--platform", "android", "--cordova-version", "6.3.0"])
            .env("CORDOVA_CACHE", &cache)
            .env("INPUT_CWD", &project)
            .env("CORDOVA_SUPPORT_PLUGIN", &plugin_src)
            .assert()
            .success()
            .stdout(predicate::str::contains("cordova invoked: plugin add"));

        let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
        assert_eq!(stdout.matches("plugin add").count(), 1);
    }

    #[test]
    fn package_task_skips_non_ios_platforms() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        let project = temp.path().join("project");
        fs::create_dir_all(project.join("plugins").join("cordova-plugin-build-support")).unwrap();
        seed_cached_tool(&cache, "6.3.0", "cordova", "#!/bin/sh\nexit 0\n");

        agent()
            .args([
                "package",
                "--platform",
                "android",
                "--cordova-version",
                "6.3.0",
            ])
            .env("CORDOVA_CACHE", &cache)
            .env("INPUT_CWD", &project)
            .assert()
            .success();
    }
}
