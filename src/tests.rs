#[cfg(test)]
mod tests {

    mod filename_tests {
        use crate::services::store::{sanitize_filename, thumbnail_name, title_for};

        #[test]
        fn test_sanitize_replaces_spaces() {
            assert_eq!(sanitize_filename("My Clip.mp4"), "My_Clip.mp4");
        }

        #[test]
        fn test_sanitize_collapses_whitespace_runs() {
            assert_eq!(sanitize_filename("  my   holiday  clip.mov "), "my_holiday_clip.mov");
        }

        #[test]
        fn test_sanitize_strips_separators() {
            assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
            assert_eq!(sanitize_filename("dir\\file.png"), "dir_file.png");
        }

        #[test]
        fn test_sanitize_folds_unicode() {
            assert_eq!(sanitize_filename("Café.jpg"), "Cafe.jpg");
        }

        #[test]
        fn test_sanitize_drops_punctuation() {
            assert_eq!(sanitize_filename("hello!(world).webm"), "helloworld.webm");
        }

        #[test]
        fn test_sanitize_strips_leading_dots() {
            assert_eq!(sanitize_filename(".hidden.mp4"), "hidden.mp4");
            assert_eq!(sanitize_filename(".."), "");
        }

        #[test]
        fn test_title_from_underscored_stem() {
            assert_eq!(title_for("my_summer_trip.mp4"), "My Summer Trip");
        }

        #[test]
        fn test_title_lowercases_inner_letters() {
            assert_eq!(title_for("HELLO_world.png"), "Hello World");
        }

        #[test]
        fn test_title_restarts_after_digits() {
            assert_eq!(title_for("clip2go.mkv"), "Clip2Go");
        }

        #[test]
        fn test_thumbnail_name_uses_stem() {
            assert_eq!(thumbnail_name("trip.final.mp4"), "trip.final.jpg");
            assert_eq!(thumbnail_name("clip.webm"), "clip.jpg");
        }
    }

    mod kind_tests {
        use crate::models::MediaKind;
        use crate::services::store::{classify_kind, is_allowed};

        #[test]
        fn test_video_extensions() {
            for name in ["a.mp4", "b.mkv", "c.avi", "d.mov", "e.webm"] {
                assert_eq!(classify_kind(name), Some(MediaKind::Video), "{}", name);
            }
        }

        #[test]
        fn test_image_extensions() {
            for name in ["a.jpg", "b.jpeg", "c.png", "d.webp", "e.gif"] {
                assert_eq!(classify_kind(name), Some(MediaKind::Image), "{}", name);
            }
        }

        #[test]
        fn test_extension_case_insensitive() {
            assert_eq!(classify_kind("LOUD.MP4"), Some(MediaKind::Video));
            assert_eq!(classify_kind("Photo.JPG"), Some(MediaKind::Image));
        }

        #[test]
        fn test_unlisted_extensions_rejected() {
            assert!(!is_allowed("notes.txt"));
            assert!(!is_allowed("script.sh"));
            assert!(!is_allowed("archive.mp4.zip"));
            assert!(!is_allowed("noextension"));
            assert!(!is_allowed(""));
        }
    }

    mod location_tests {
        use crate::models::{Location, UserRole};

        #[test]
        fn test_location_defaults_to_pending() {
            assert_eq!(Location::from_form(None), Location::Pending);
            assert_eq!(Location::from_form(Some("")), Location::Pending);
            assert_eq!(Location::from_form(Some("pending")), Location::Pending);
        }

        #[test]
        fn test_location_anything_else_is_approved() {
            assert_eq!(Location::from_form(Some("approved")), Location::Approved);
            assert_eq!(Location::from_form(Some("published")), Location::Approved);
        }

        #[test]
        fn test_role_from_loose() {
            assert_eq!(UserRole::from_loose("admin"), UserRole::Admin);
            assert_eq!(UserRole::from_loose(" ADMIN "), UserRole::Admin);
            assert_eq!(UserRole::from_loose("editor"), UserRole::User);
            assert_eq!(UserRole::from_loose(""), UserRole::User);
        }

        #[test]
        fn test_role_strict_parse() {
            assert_eq!("user".parse::<UserRole>(), Ok(UserRole::User));
            assert!("owner".parse::<UserRole>().is_err());
        }
    }

    mod identity_tests {
        use crate::models::{Capability, Identity, UserRole};

        #[test]
        fn test_user_can_browse_and_upload() {
            let user = Identity::new("alice", UserRole::User);
            assert!(user.can(Capability::Browse));
            assert!(user.can(Capability::Upload));
            assert!(!user.can(Capability::Moderate));
        }

        #[test]
        fn test_admin_role_moderates() {
            let admin = Identity::new("root", UserRole::Admin);
            assert!(admin.is_moderator());
        }

        #[test]
        fn test_elevated_user_moderates() {
            let user = Identity::new("alice", UserRole::User).elevated();
            assert!(user.is_moderator());
        }
    }

    mod config_tests {
        use crate::config::{parse_duration, parse_size, ThumbnailBackendKind, MAX_SESSION_LIFETIME};
        use crate::Config;
        use std::time::Duration;

        #[test]
        fn test_parse_duration_units() {
            assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
            assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
            assert_eq!(parse_duration("10h").unwrap(), Duration::from_secs(36000));
            assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604800));
        }

        #[test]
        fn test_parse_duration_rejects_bad_input() {
            assert!(parse_duration("0").is_err());
            assert!(parse_duration("ten").is_err());
            assert!(parse_duration("5w").is_err());
        }

        #[test]
        fn test_parse_duration_rejects_overflow() {
            assert!(parse_duration("300000000000000000d").is_err());
            assert!(parse_duration("18446744073709551615m").is_err());
            assert!(parse_duration("18446744073709551615").is_ok());
        }

        #[test]
        fn test_session_lifetime_is_capped() {
            let mut config = Config::default();
            config.auth.session_lifetime = "365d".to_string();
            assert_eq!(config.session_lifetime().unwrap(), MAX_SESSION_LIFETIME);
            assert!(config.validate().is_ok());

            config.auth.session_lifetime = "400d".to_string();
            assert!(config.session_lifetime().is_err());
            assert!(config.validate().is_err());

            config.auth.session_lifetime = "18446744073709551615".to_string();
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_parse_size_units() {
            assert_eq!(parse_size("512").unwrap(), 512);
            assert_eq!(parse_size("2KB").unwrap(), 2048);
            assert_eq!(parse_size("10mb").unwrap(), 10 * 1024 * 1024);
            assert_eq!(parse_size("1GB").unwrap(), 1024 * 1024 * 1024);
        }

        #[test]
        fn test_parse_size_rejects_unknown_unit() {
            assert!(parse_size("1TB").is_err());
            assert!(parse_size("MB").is_err());
        }

        #[test]
        fn test_defaults() {
            let config = Config::default();
            assert_eq!(config.server.port, 5000);
            assert_eq!(config.thumbnails.backend, ThumbnailBackendKind::Auto);
            assert_eq!(config.thumbnails.width, 400);
            assert_eq!(config.session_lifetime().unwrap(), Duration::from_secs(36000));
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_partial_toml_uses_defaults() {
            let config: Config = toml::from_str(
                r#"
                [thumbnails]
                backend = "disabled"
                "#,
            )
            .unwrap();
            assert_eq!(config.thumbnails.backend, ThumbnailBackendKind::Disabled);
            assert_eq!(config.thumbnails.seek_ms, 2000);
            assert_eq!(config.uploads.max_size, "1GB");
        }

        #[test]
        fn test_validate_rejects_zero_width() {
            let mut config = Config::default();
            config.thumbnails.width = 0;
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_credential_files_live_under_root() {
            let config = Config::for_root("/srv/gallery");
            assert!(config.users_file().ends_with("all-pass/login-pass.json"));
            assert!(config.admin_file().starts_with("/srv/gallery"));
        }
    }

    mod auth_tests {
        use crate::services::auth::{
            generate_session_token, hash_password, validate_password, validate_username,
            verify_secret,
        };

        #[test]
        fn test_hash_and_verify() {
            let hash = hash_password("Password123").unwrap();
            assert!(hash.starts_with("$argon2"));
            assert!(verify_secret(&hash, "Password123"));
            assert!(!verify_secret(&hash, "Password124"));
        }

        #[test]
        fn test_plaintext_secret() {
            assert!(verify_secret("letmein", "letmein"));
            assert!(!verify_secret("letmein", "letmein "));
            assert!(!verify_secret("letmein", ""));
        }

        #[test]
        fn test_empty_stored_secret_never_matches() {
            assert!(!verify_secret("", ""));
        }

        #[test]
        fn test_unsupported_hash_formats_rejected() {
            assert!(!verify_secret("pbkdf2:sha256:600000$salt$abc", "anything"));
            assert!(!verify_secret("scrypt:32768:8:1$salt$abc", "anything"));
        }

        #[test]
        fn test_password_policy() {
            assert!(validate_password("Password123").is_ok());
            assert!(validate_password("short1A").is_err());
            assert!(validate_password("alllowercase1").is_err());
            assert!(validate_password("NoDigitsHere").is_err());
        }

        #[test]
        fn test_username_policy() {
            assert!(validate_username("alice.smith").is_ok());
            assert!(validate_username("").is_err());
            assert!(validate_username("bad name").is_err());
        }

        #[test]
        fn test_session_tokens_are_unique() {
            let a = generate_session_token();
            let b = generate_session_token();
            assert_ne!(a, b);
            assert_eq!(a.len(), 43);
        }
    }

    mod session_tests {
        use crate::config::MAX_SESSION_LIFETIME;
        use crate::services::session::SessionStore;
        use std::time::Duration;

        #[test]
        fn test_create_and_get() {
            let store = SessionStore::new(Duration::from_secs(60));
            let token = store.create("alice", false);
            let session = store.get(&token).unwrap();
            assert_eq!(session.username, "alice");
            assert!(!session.elevated);
        }

        #[test]
        fn test_elevate_rotates_token() {
            let store = SessionStore::new(Duration::from_secs(60));
            let token = store.create("alice", false);
            let elevated = store.elevate(&token).unwrap();

            assert_ne!(token, elevated);
            assert!(store.get(&token).is_none());
            assert!(store.get(&elevated).unwrap().elevated);
        }

        #[test]
        fn test_expired_sessions_are_dropped() {
            let store = SessionStore::new(Duration::from_millis(1));
            let token = store.create("alice", false);
            std::thread::sleep(Duration::from_millis(10));

            assert!(store.get(&token).is_none());
            assert_eq!(store.cleanup(), 0);
        }

        #[test]
        fn test_cleanup_counts_removed() {
            let store = SessionStore::new(Duration::from_millis(1));
            store.create("alice", false);
            store.create("bob", false);
            std::thread::sleep(Duration::from_millis(10));

            assert_eq!(store.cleanup(), 2);
        }

        #[test]
        fn test_huge_lifetime_is_clamped() {
            let store = SessionStore::new(Duration::MAX);
            assert_eq!(store.lifetime(), MAX_SESSION_LIFETIME);

            let token = store.create("alice", false);
            assert_eq!(store.get(&token).unwrap().username, "alice");
        }

        #[test]
        fn test_remove() {
            let store = SessionStore::new(Duration::from_secs(60));
            let token = store.create("alice", false);
            store.remove(&token);
            assert!(store.get(&token).is_none());
        }
    }

    mod rate_limiter_tests {
        use crate::web::security::RateLimiter;
        use std::time::Duration;

        #[test]
        fn test_locks_out_after_max_attempts() {
            let limiter = RateLimiter::new(3, Duration::from_secs(60));
            for _ in 0..3 {
                assert!(limiter.check("login:alice"));
                limiter.record_attempt("login:alice");
            }
            assert!(!limiter.check("login:alice"));
            assert!(limiter.check("login:bob"));
        }

        #[test]
        fn test_clear_resets_key() {
            let limiter = RateLimiter::new(1, Duration::from_secs(60));
            limiter.record_attempt("k");
            assert!(!limiter.check("k"));
            limiter.clear("k");
            assert!(limiter.check("k"));
        }
    }

    mod image_tests {
        use crate::services::image::{encode_jpeg, resize_to_width, scaled_height};
        use image::{DynamicImage, GenericImageView, RgbImage};

        #[test]
        fn test_scaled_height_keeps_aspect() {
            assert_eq!(scaled_height(1920, 1080, 400), 225);
            assert_eq!(scaled_height(640, 480, 400), 300);
        }

        #[test]
        fn test_scaled_height_never_zero() {
            assert_eq!(scaled_height(10000, 1, 400), 1);
            assert_eq!(scaled_height(0, 100, 400), 1);
        }

        #[test]
        fn test_resize_and_encode() {
            let frame = DynamicImage::ImageRgb8(RgbImage::new(160, 90));
            let resized = resize_to_width(&frame, 80);
            assert_eq!(resized.dimensions(), (80, 45));

            let jpeg = encode_jpeg(&resized).unwrap();
            assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        }
    }

    mod seek_tests {
        use crate::services::thumbnail::{frame_reaches, seek_in_ticks};
        use std::time::Duration;

        #[test]
        fn test_seek_in_ticks() {
            let seek = Duration::from_secs(2);
            assert_eq!(seek_in_ticks(seek, 1, 90000), 180000);
            assert_eq!(seek_in_ticks(seek, 1, 1000), 2000);
            assert_eq!(seek_in_ticks(seek, 1001, 30000), 59);
            assert_eq!(seek_in_ticks(Duration::from_millis(1500), 1, 48000), 72000);
        }

        #[test]
        fn test_seek_in_ticks_bad_time_base() {
            let seek = Duration::from_secs(2);
            assert_eq!(seek_in_ticks(seek, 0, 90000), 0);
            assert_eq!(seek_in_ticks(seek, 1, 0), 0);
            assert_eq!(seek_in_ticks(seek, -1, 90000), 0);
        }

        #[test]
        fn test_seek_in_ticks_saturates() {
            assert_eq!(seek_in_ticks(Duration::MAX, 1, i32::MAX), i64::MAX);
        }

        #[test]
        fn test_keyframe_before_target_is_skipped() {
            assert!(!frame_reaches(Some(0), 180000));
            assert!(!frame_reaches(Some(179999), 180000));
            assert!(frame_reaches(Some(180000), 180000));
            assert!(frame_reaches(Some(183003), 180000));
        }

        #[test]
        fn test_untimed_frame_is_accepted() {
            assert!(frame_reaches(None, 180000));
        }
    }

    mod move_tests {
        use crate::services::store::copy_then_remove;
        use std::fs;
        use std::path::Path;
        use tempfile::TempDir;

        fn entries(dir: &Path) -> Vec<String> {
            let mut names: Vec<String> = fs::read_dir(dir)
                .unwrap()
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        }

        #[test]
        fn test_copy_then_remove_moves_content() {
            let from = TempDir::new().unwrap();
            let to = TempDir::new().unwrap();
            let source = from.path().join("clip.mp4");
            let dest = to.path().join("clip.mp4");
            fs::write(&source, b"frames").unwrap();

            copy_then_remove(&source, &dest).unwrap();

            assert_eq!(fs::read(&dest).unwrap(), b"frames");
            assert!(!source.exists());
            assert_eq!(entries(to.path()), vec!["clip.mp4"]);
        }

        #[test]
        fn test_missing_source_leaves_nothing_behind() {
            let from = TempDir::new().unwrap();
            let to = TempDir::new().unwrap();

            let result =
                copy_then_remove(&from.path().join("gone.mp4"), &to.path().join("gone.mp4"));

            assert!(result.is_err());
            assert!(entries(to.path()).is_empty());
        }

        #[cfg(unix)]
        #[test]
        fn test_undeletable_source_rolls_back_dest() {
            use std::os::unix::fs::PermissionsExt;

            let from = TempDir::new().unwrap();
            let to = TempDir::new().unwrap();
            let locked = from.path().join("locked");
            fs::create_dir(&locked).unwrap();
            let source = locked.join("clip.mp4");
            let dest = to.path().join("clip.mp4");
            fs::write(&source, b"frames").unwrap();
            let check = locked.join("check");
            fs::write(&check, b"").unwrap();

            fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
            // privileged users can still unlink from a read-only directory
            let blocked = fs::remove_file(&check).is_err();
            let result = copy_then_remove(&source, &dest);
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

            if !blocked {
                return;
            }
            assert!(result.is_err());
            assert!(!dest.exists());
            assert_eq!(fs::read(&source).unwrap(), b"frames");
            assert!(entries(to.path()).is_empty());
        }
    }
}
