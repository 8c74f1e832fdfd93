use instcheck_core::{check_manifests, reconcile, CheckConfig, PolicyRule, EXIT_MISMATCH};
use instcheck_schema::{
    load_manifest_str, BuildOptions, LibSuffixScope, LoadOptions, NormalizeOptions,
    NormalizedManifest, PathNormalizer, SHARED_LIBRARY_SUFFIXES,
};
use std::fs;
use std::path::{Path, PathBuf};

const REFERENCE: &str = "\
# OpenEXR install manifest
bin/exrheader
bin/exrinfo
include/OpenEXR/ImfHeader.h
include/OpenEXR/ImfIO.h
lib/cmake/OpenEXR/OpenEXRConfig.cmake
lib/libOpenEXR.so
lib/libOpenEXRCore.so
lib/libIex.so
lib/pkgconfig/OpenEXR.pc
python/OpenEXR/__init__.py
share/docs/examples/drawImage.cpp
";

fn write_manifest(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn normalized(input: &str) -> NormalizedManifest {
    PathNormalizer::default().normalize_all(load_manifest_str(input, &LoadOptions::default()))
}

const SAMPLE_PATHS: &[&str] = &[
    "lib64/libfoo",
    "usr/lib64/libbar-2_5",
    "lib64/cmake/Foo/FooConfig.cmake",
    "lib64/python3/site-packages/foo",
    "lib/lib64/nested",
];

#[test]
fn lib64_and_lib_normalize_identically() {
    let n = PathNormalizer::default();
    for path in SAMPLE_PATHS {
        let generic = path.replace("lib64/", "lib/");
        for suffix in ["", ".so", ".dylib", ".dll", ".a", ".h"] {
            assert_eq!(
                n.normalize(&format!("{path}{suffix}")),
                n.normalize(&format!("{generic}{suffix}")),
                "{path}{suffix}"
            );
        }
    }
}

#[test]
fn every_shared_suffix_pair_is_equivalent() {
    let n = PathNormalizer::default();
    for path in SAMPLE_PATHS {
        for a in SHARED_LIBRARY_SUFFIXES {
            for b in SHARED_LIBRARY_SUFFIXES {
                assert_eq!(
                    n.normalize(&format!("{path}{a}")),
                    n.normalize(&format!("{path}{b}"))
                );
            }
        }
    }
}

#[test]
fn normalizing_twice_changes_nothing() {
    let normalizers = [
        PathNormalizer::default(),
        PathNormalizer::new(&NormalizeOptions {
            library_suffix: Some("_d".to_owned()),
            library_suffix_scope: LibSuffixScope::LibraryDir,
        }),
        PathNormalizer::new(&NormalizeOptions {
            library_suffix: Some("-3_2".to_owned()),
            library_suffix_scope: LibSuffixScope::Anywhere,
        }),
    ];
    for n in &normalizers {
        for path in SAMPLE_PATHS {
            for suffix in ["", ".so", "_d.so", "-3_2.dll", ".so.3", ".dylib.dll"] {
                let once = n.normalize(&format!("{path}{suffix}"));
                assert_eq!(n.normalize(&once), once);
            }
        }
    }
}

#[test]
fn linux_reference_matches_macos_install() {
    let macos = REFERENCE.replace(".so", ".dylib").replace("lib/", "lib64/");
    let report = reconcile(
        &normalized(&macos),
        &normalized(REFERENCE),
        &BuildOptions::default(),
    );
    assert!(report.passed, "{report:?}");
}

#[test]
fn swapped_inputs_give_mirrored_report() {
    let generated = normalized("bin/exrinfo\nbin/exrnew\nlib/libIex.dll\n");
    let reference = normalized(REFERENCE);
    let options = BuildOptions::default();
    let forward = reconcile(&generated, &reference, &options);
    let backward = reconcile(&reference, &generated, &options);
    assert_eq!(forward.comparison.missing, backward.comparison.extra);
    assert_eq!(forward.comparison.extra, backward.comparison.missing);
}

#[test]
fn minimal_configuration_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let reference = write_manifest(dir.path(), "reference.txt", REFERENCE);
    let generated = write_manifest(
        dir.path(),
        "generated.txt",
        "\
/work/_install/include/OpenEXR/ImfHeader.h
/work/_install/include/OpenEXR/ImfIO.h
/work/_install/lib64/cmake/OpenEXR/OpenEXRConfig.cmake
/work/_install/lib64/libOpenEXR.so
/work/_install/lib64/libOpenEXRCore.so
/work/_install/lib64/libIex.so
/work/_install/lib64/libdeflate.a
",
    );

    let mut config = CheckConfig {
        load: LoadOptions {
            exclude: vec!["deflate".to_owned()],
            root_marker: Some("_install".to_owned()),
            install_prefix: None,
        },
        ..CheckConfig::default()
    };
    let report = check_manifests(&generated, &reference, &config).unwrap();
    assert!(!report.passed);
    assert_eq!(report.comparison.missing.len(), 5);

    config.build = BuildOptions {
        tools: false,
        examples: false,
        pkg_config: false,
        bindings: false,
        ..BuildOptions::default()
    };
    let report = check_manifests(&generated, &reference, &config).unwrap();
    // Binding entries are exempt; the rest are genuine mismatches.
    assert_eq!(report.exempted.len(), 1);
    assert_eq!(report.comparison.missing.len(), 4);
    assert!(report.violations.is_empty());
}

#[test]
fn policy_violation_alongside_mismatches() {
    let generated = normalized("bin/exrinfo\nlib/libOpenEXR.a\nlib/libOpenEXR.so\n");
    let reference = normalized("lib/libOpenEXR.so\n");
    let options = BuildOptions {
        shared_libs: true,
        tools: false,
        ..BuildOptions::default()
    };
    let report = reconcile(&generated, &reference, &options);
    assert_eq!(report.comparison.extra.len(), 2);
    let rules: Vec<&PolicyRule> = report.violations.iter().map(|v| &v.rule).collect();
    assert_eq!(rules.len(), 2);
    assert!(rules.contains(&&PolicyRule::ForbidStaticArchives));
    assert_eq!(instcheck_core::exit_status(&report), EXIT_MISMATCH);
}
