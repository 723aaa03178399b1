use crate::model::Rules;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    /// 0 picks a fresh seed from the OS each run.
    pub(crate) seed: u64,
    pub(crate) rules: Rules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            enable_color: true,
            seed: 0,
            rules: Rules::default(),
        }
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "pocketpet", "PocketPet")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("pocketpet.log"),
    })
}

/// Missing or unreadable settings fall back to defaults; a broken file is
/// logged, not fatal.
pub(crate) fn load_settings(path: &Path) -> Settings {
    let Ok(s) = fs::read_to_string(path) else {
        return Settings::default();
    };
    match serde_json::from_str::<Settings>(&s) {
        Ok(v) => Settings {
            rules: v.rules.sanitized(),
            ..v
        },
        Err(err) => {
            log::warn!("ignoring {}: {err}", path.display());
            Settings::default()
        }
    }
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

pub(crate) fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)
        .with_context(|| format!("renaming {} to {}", from.display(), to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pocketpet-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join("settings.json")
    }

    #[test]
    fn settings_survive_a_save_and_load() {
        let path = scratch("roundtrip");
        let mut s = Settings::default();
        s.seed = 42;
        s.rules.snake_step_ms = 150;
        save_settings_atomic(&path, &s).unwrap();
        save_settings_atomic(&path, &s).unwrap();

        let back = load_settings(&path);
        assert_eq!(back.seed, 42);
        assert_eq!(back.rules.snake_step_ms, 150);
        assert!(!path.with_extension("json.tmp").exists());
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = scratch("partial");
        fs::write(&path, r#"{ "fps_cap": 60, "rules": { "poop_max": 2 } }"#).unwrap();
        let s = load_settings(&path);
        assert_eq!(s.fps_cap, 60);
        assert!(s.enable_color);
        assert_eq!(s.rules.poop_max, 2);
        assert_eq!(s.rules.metabolism_step_ms, 15_000);
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn out_of_range_rules_are_pulled_back() {
        let path = scratch("sanitize");
        fs::write(
            &path,
            r#"{ "rules": { "poop_chance": 1.5, "sick_chance": -0.2, "poop_max": 9, "dirty_above": 7, "decay_awake": 2.0 } }"#,
        )
        .unwrap();
        let rules = load_settings(&path).rules;
        assert_eq!(rules.poop_chance, 1.0);
        assert_eq!(rules.sick_chance, 0.0);
        assert_eq!(rules.poop_max, 4);
        assert_eq!(rules.dirty_above, 4);
        assert_eq!(rules.decay_awake, 2.0);
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn sanitized_rules_keep_the_poop_cap_and_never_panic() {
        use crate::model::{Pet, Stage};
        use crate::sim::Metabolism;
        use rand::rngs::SmallRng;
        use rand::SeedableRng;

        let rules = Rules {
            poop_chance: 1.5,
            sick_chance: f64::NAN,
            poop_max: 9,
            ..Rules::default()
        }
        .sanitized();
        assert_eq!(rules.sick_chance, Rules::default().sick_chance);

        let mut pet = Pet {
            stage: Stage::Child,
            ..Pet::new_egg(chrono::Utc::now())
        };
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..10 {
            Metabolism::default().tick(&mut pet, &rules, &mut rng);
        }
        assert_eq!(pet.poop_count, 4);
    }

    #[test]
    fn garbage_or_missing_file_gives_defaults() {
        let path = scratch("garbage");
        assert_eq!(load_settings(&path).fps_cap, 30);
        fs::write(&path, "not json").unwrap();
        assert_eq!(load_settings(&path).fps_cap, 30);
        fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
