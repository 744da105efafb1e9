//! Integration tests for drctl

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn drctl() -> Command {
        cargo_bin_cmd!("drctl")
    }

    /// drctl with a config file whose cache root lives in `temp`
    fn drctl_in(temp: &TempDir) -> Command {
        let config = temp.path().join("config.toml");
        std::fs::write(
            &config,
            format!(
                "[cache]\nroot = {:?}\n",
                temp.path().join("cache").display().to_string()
            ),
        )
        .unwrap();

        let mut cmd = drctl();
        cmd.arg("--config").arg(config);
        cmd
    }

    #[test]
    fn help_displays() {
        drctl()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Deploy the DR operator"));
    }

    #[test]
    fn version_displays() {
        drctl()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("drctl"));
    }

    #[test]
    fn help_describes_package() {
        drctl()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_DESCRIPTION")));
    }

    #[test]
    fn settings_path() {
        let temp = TempDir::new().unwrap();
        drctl_in(&temp)
            .args(["settings", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn settings_show() {
        let temp = TempDir::new().unwrap();
        drctl_in(&temp)
            .args(["settings", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[deploy]"))
            .stdout(predicate::str::contains("ramen-system"));
    }

    #[test]
    fn invalid_config_fails() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("bad.toml");
        std::fs::write(&config, "[cache\n").unwrap();

        drctl()
            .arg("--config")
            .arg(&config)
            .args(["settings", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn deploy_without_clusters_fails() {
        let temp = TempDir::new().unwrap();
        drctl_in(&temp)
            .args(["deploy", "--skip-resources"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No clusters to deploy to"));
    }

    #[test]
    fn deploy_with_bad_env_file_fails() {
        let temp = TempDir::new().unwrap();
        let env = temp.path().join("env.yaml");
        std::fs::write(&env, "name: no-ramen\n").unwrap();

        drctl_in(&temp)
            .arg("deploy")
            .arg("--env-file")
            .arg(&env)
            .assert()
            .failure()
            .stderr(predicate::str::contains("missing 'ramen' section"));
    }

    #[test]
    fn settings_init_keeps_existing_file() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("settings").join("config.toml");

        drctl()
            .arg("--config")
            .arg(&config)
            .args(["settings", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Settings written"));
        assert!(std::fs::read_to_string(&config)
            .unwrap()
            .contains("[configure]"));

        drctl()
            .arg("--config")
            .arg(&config)
            .args(["settings", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exist"));
    }

    #[test]
    fn config_requires_env_file() {
        drctl()
            .arg("config")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--env-file"));
    }

    #[test]
    fn config_needs_two_clusters() {
        let temp = TempDir::new().unwrap();
        let env = temp.path().join("env.yaml");
        std::fs::write(&env, "ramen:\n  hub: hub\n  clusters: [dr1]\n").unwrap();

        drctl_in(&temp)
            .arg("config")
            .arg("--env-file")
            .arg(&env)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Environment has no pair of managed clusters"));
    }

    #[test]
    fn config_rejects_unknown_topology() {
        let temp = TempDir::new().unwrap();
        let env = temp.path().join("env.yaml");
        std::fs::write(
            &env,
            "ramen:\n  hub: hub\n  clusters: [dr1, dr2]\n  topology: stretched\n",
        )
        .unwrap();

        drctl_in(&temp)
            .arg("config")
            .arg("--env-file")
            .arg(&env)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid environment file"));
    }

    #[test]
    fn dump_e2e_config_needs_output_or_name() {
        let temp = TempDir::new().unwrap();
        let env = temp.path().join("env.yaml");
        std::fs::write(&env, "ramen:\n  hub: hub\n  clusters: [dr1, dr2]\n").unwrap();

        drctl_in(&temp)
            .arg("dump-e2e-config")
            .arg("--env-file")
            .arg(&env)
            .assert()
            .failure()
            .stderr(predicate::str::contains("--output-dir"));
    }

    #[test]
    fn cache_clear_missing_is_ok() {
        let temp = TempDir::new().unwrap();
        drctl_in(&temp)
            .args(["cache", "clear", "no-such-key"])
            .assert()
            .success();
        drctl_in(&temp).args(["cache", "clear"]).assert().success();
    }

    #[test]
    fn cache_list_empty() {
        let temp = TempDir::new().unwrap();
        drctl_in(&temp)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached bundles"));
    }

    #[test]
    fn cache_rejects_escaping_key() {
        let temp = TempDir::new().unwrap();
        drctl_in(&temp)
            .args(["cache", "clear", "../outside"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache key"));
    }

    #[test]
    fn cache_rejects_tmp_key() {
        let temp = TempDir::new().unwrap();
        drctl_in(&temp)
            .args(["cache", "get", "addons/foo", "foo.tmp"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache key"));
    }

    #[cfg(unix)]
    fn fake_tool(dir: &Path, name: &str, script: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    fn path_with(dir: &Path) -> String {
        let path = std::env::var("PATH").unwrap_or_default();
        format!("{}:{}", dir.display(), path)
    }

    #[cfg(unix)]
    #[test]
    fn cache_get_builds_once() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        std::fs::create_dir(&bin).unwrap();
        let counter = temp.path().join("builds");
        fake_tool(
            &bin,
            "kustomize",
            &format!(
                "#!/bin/sh\necho build >> {}\necho \"kind: Bundle\"\necho \"dir: $2\"\n",
                counter.display()
            ),
        );

        let expected = temp.path().join("cache").join("addons").join("foo");
        for _ in 0..2 {
            drctl_in(&temp)
                .env("PATH", path_with(&bin))
                .args(["cache", "get", "addons/foo/cache", "addons/foo"])
                .assert()
                .success()
                .stdout(predicate::str::contains(expected.display().to_string()));
        }

        let content = std::fs::read_to_string(&expected).unwrap();
        assert_eq!(content, "kind: Bundle\ndir: addons/foo/cache\n");
        assert_eq!(std::fs::read_to_string(&counter).unwrap().lines().count(), 1);

        drctl_in(&temp)
            .args(["cache", "list", "--format", "plain"])
            .assert()
            .success()
            .stdout("addons/foo\n");
    }

    #[cfg(unix)]
    #[test]
    fn cache_build_failure_reports_stderr() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        std::fs::create_dir(&bin).unwrap();
        fake_tool(&bin, "kustomize", "#!/bin/sh\necho partial\necho 'no kustomization' >&2\nexit 1\n");

        drctl_in(&temp)
            .env("PATH", path_with(&bin))
            .args(["cache", "refresh", "missing-dir", "foo"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("no kustomization"))
            .stderr(predicate::str::contains("exit code: 1"));

        let cache = temp.path().join("cache");
        assert!(!cache.join("foo").exists());
        assert!(!cache.join("foo.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn dump_e2e_config_writes_kubeconfigs() {
        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        std::fs::create_dir(&bin).unwrap();
        // Prints the --context argument, like a minified kubeconfig would name it.
        fake_tool(&bin, "kubectl", "#!/bin/sh\necho \"current-context: ${1#--context=}\"\n");

        let env = temp.path().join("env.yaml");
        std::fs::write(
            &env,
            "name: rdr\nramen:\n  hub: hub\n  clusters: [dr1, dr2]\n",
        )
        .unwrap();
        let out = temp.path().join("e2e");

        drctl_in(&temp)
            .env("PATH", path_with(&bin))
            .arg("dump-e2e-config")
            .arg("--env-file")
            .arg(&env)
            .arg("--name-prefix")
            .arg("rdr-")
            .arg("--output-dir")
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("config.yaml"));

        let kubeconfig = std::fs::read_to_string(out.join("kubeconfigs").join("rdr-dr2")).unwrap();
        assert_eq!(kubeconfig, "current-context: rdr-dr2\n");

        let config = std::fs::read_to_string(out.join("config.yaml")).unwrap();
        for name in ["hub:", "c1:", "c2:", "kubeconfigpath:"] {
            assert!(config.contains(name), "{name} missing from {config}");
        }
    }
}
