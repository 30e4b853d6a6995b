mod common;

use std::{ptr, rc::Rc};

use common::{class, init_logger, parse_method, FakeAnalyser, PoolBuilder, RecordBuilder};
use unbrew_class_file::{attributes::CodeAttribute, AccessFlags, MethodAccessFlags};
use unbrew_entities::{
    ClassContext, CodeAnalyser, ConstructorKind, DecompilerComments, EntityError, HiddenState,
    JavaType, LocalClassRegistry, MemberOptions, Method, RawType, RefType, StringDumper,
    StructuredBody, TypeUsageSet,
};

const ACC_PUBLIC: u16 = 0x0001;
const ACC_PRIVATE: u16 = 0x0002;
const ACC_STATIC: u16 = 0x0008;

fn with_method(
    class: Rc<ClassContext>,
    build: impl FnOnce(RecordBuilder) -> RecordBuilder,
    flags: u16,
    name: &str,
    descriptor: &str,
    f: impl FnOnce(Method),
) {
    with_method_options(class, build, flags, name, descriptor, MemberOptions::default(), f)
}

fn with_method_options(
    class: Rc<ClassContext>,
    build: impl FnOnce(RecordBuilder) -> RecordBuilder,
    flags: u16,
    name: &str,
    descriptor: &str,
    options: MemberOptions,
    f: impl FnOnce(Method),
) {
    init_logger();
    let mut pool = PoolBuilder::new();
    let raw = build(RecordBuilder::new(&mut pool, flags, name, descriptor)).build();
    f(parse_method(pool, &raw, class, options).unwrap());
}

fn inner_class() -> Rc<ClassContext> {
    Rc::new(ClassContext::new(RefType::new("p/Outer$Inner"), AccessFlags::SUPER).inner())
}

fn enum_class() -> Rc<ClassContext> {
    Rc::new(ClassContext::new(
        RefType::new("p/Color"),
        AccessFlags::PUBLIC | AccessFlags::FINAL | AccessFlags::SUPER | AccessFlags::ENUM,
    ))
}

fn render(method: &Method, as_interface: bool) -> String {
    let mut d = StringDumper::new();
    method
        .dump(&mut d, as_interface, &FakeAnalyser::default())
        .unwrap();
    d.into_string()
}

#[test]
fn test_descriptor_prototype() {
    with_method(class("p/A"), |r| r, ACC_PUBLIC, "f", "(I)V", |method| {
        let prototype = method.prototype();
        assert_eq!(&[JavaType::Raw(RawType::Int)][..], prototype.args());
        assert_eq!(&JavaType::Raw(RawType::Void), prototype.return_type());
        assert_eq!(ConstructorKind::Not, method.constructor_kind());
        assert!(prototype.is_instance_method());
        assert!(prototype.descriptor_fallback().is_none());
    });
}

#[test]
fn test_inner_class_constructor_signature_is_patched() {
    with_method(
        inner_class(),
        |r| r.signature("(Ljava/util/List<Ljava/lang/String;>;)V"),
        ACC_PUBLIC,
        "<init>",
        "(Lp/Outer;Ljava/util/List;)V",
        |method| {
            let prototype = method.prototype();
            assert_eq!(ConstructorKind::Constructor, prototype.constructor_kind());
            assert_eq!(2, prototype.args().len());
            assert_eq!(JavaType::class("p/Outer"), prototype.args()[0]);
            assert_eq!(
                "java.util.List<java.lang.String>",
                prototype.args()[1].to_string()
            );
            assert!(prototype.descriptor_fallback().is_none());
        },
    );
}

#[test]
fn test_inner_class_patch_erases_type_variables() {
    with_method(
        inner_class(),
        |r| r.signature("<T:Ljava/lang/Number;>(TT;[TT;)V"),
        ACC_PUBLIC,
        "<init>",
        "(Lp/Outer;Ljava/lang/Number;[Ljava/lang/Number;)V",
        |method| {
            let prototype = method.prototype();
            assert_eq!(3, prototype.args().len());
            assert_eq!(JavaType::class("p/Outer"), prototype.args()[0]);
            assert_eq!(JavaType::TypeVariable("T".into()), prototype.args()[1]);
        },
    );
}

#[test]
fn test_inner_class_incompatible_signature_falls_back() {
    with_method(
        inner_class(),
        |r| r.signature("(Ljava/lang/String;)V"),
        ACC_PUBLIC,
        "<init>",
        "(Lp/Outer;I)V",
        |method| {
            let prototype = method.prototype();
            assert_eq!(1, prototype.args().len());
            let fallback = prototype.descriptor_fallback().unwrap();
            assert_eq!(
                &[JavaType::class("p/Outer"), JavaType::Raw(RawType::Int)][..],
                fallback.args()
            );
            assert_eq!(fallback.args(), prototype.effective().args());
            assert_eq!(&["arg0".to_owned(), "arg1".to_owned()][..], method.parameter_names());
        },
    );
}

#[test]
fn test_inner_class_count_mismatch_by_two_falls_back() {
    with_method(
        inner_class(),
        |r| r.signature("(I)V"),
        ACC_PUBLIC,
        "<init>",
        "(Lp/Outer;Ljava/lang/String;I)V",
        |method| {
            assert_eq!(3, method.prototype().effective().args().len());
            assert!(method.prototype().descriptor_fallback().is_some());
        },
    );
}

#[test]
fn test_top_level_class_signature_used_as_is() {
    with_method(
        class("p/A"),
        |r| r.signature("(Ljava/util/List<Ljava/lang/String;>;)V"),
        ACC_PUBLIC,
        "<init>",
        "(Lp/Outer;Ljava/util/List;)V",
        |method| {
            assert_eq!(1, method.prototype().args().len());
            assert!(method.prototype().descriptor_fallback().is_none());
        },
    );
}

#[test]
fn test_enum_constructor_legacy_form() {
    with_method(
        enum_class(),
        |r| r.code(&[]),
        ACC_PRIVATE,
        "<init>",
        "(Ljava/lang/String;ID)V",
        |method| {
            assert_eq!(
                ConstructorKind::EnumConstructorLegacyForm,
                method.constructor_kind()
            );
            assert!(method.is_constructor());
            assert_eq!(3, method.prototype().args().len());
            assert_eq!(2, method.prototype().hidden_leading_args());
            assert_eq!(
                "private Color(double arg2) {\n// 1 instructions\n}\n",
                render(&method, false)
            );
        },
    );
}

#[test]
fn test_enum_constructor_signature_form_skips_hidden_slots() {
    with_method(
        enum_class(),
        |r| {
            r.signature("(D)V")
                .code(&[("this", "Lp/Color;", 0), ("rgb", "D", 3)])
        },
        ACC_PRIVATE,
        "<init>",
        "(Ljava/lang/String;ID)V",
        |method| {
            assert_eq!(ConstructorKind::EnumConstructor, method.constructor_kind());
            assert_eq!(&["rgb".to_owned()][..], method.parameter_names());
            assert_eq!(
                "private Color(double rgb) {\n// 1 instructions\n}\n",
                render(&method, false)
            );
        },
    );
}

#[test]
fn test_static_initializer() {
    with_method(
        class("p/A"),
        |r| r.code(&[]),
        ACC_STATIC,
        "<clinit>",
        "()V",
        |method| {
            assert_eq!(ConstructorKind::StaticInitializer, method.constructor_kind());
            assert!(!method.is_constructor());
            assert!(!method.prototype().is_instance_method());
            assert_eq!("static {\n// 1 instructions\n}\n", render(&method, false));
        },
    );
}

#[test]
fn test_parameter_names_from_table() {
    with_method(
        class("p/A"),
        |r| r.code(&[("this", "Lp/A;", 0), ("count", "J", 1), ("limit", "I", 3)]),
        ACC_PUBLIC,
        "f",
        "(JI)V",
        |method| {
            assert!(!method.prototype().parameters_computed());
            assert_eq!(
                &["count".to_owned(), "limit".to_owned()][..],
                method.parameter_names()
            );
            assert!(method.prototype().parameters_computed());
        },
    );
}

#[test]
fn test_parameter_names_without_table_option() {
    let options = MemberOptions {
        use_name_table: false,
        ..MemberOptions::default()
    };
    with_method_options(
        class("p/A"),
        |r| r.code(&[("this", "Lp/A;", 0), ("count", "I", 1)]),
        ACC_PUBLIC,
        "f",
        "(I)V",
        options,
        |method| assert_eq!(&["arg0".to_owned()][..], method.parameter_names()),
    );
}

#[test]
fn test_release_then_analyse_fails() {
    with_method(
        class("p/A"),
        |r| r.code(&[]).attribute("Deprecated", &[]),
        ACC_PUBLIC,
        "run",
        "()V",
        |mut method| {
            let analyser = FakeAnalyser::default();
            let first = method.analysis(&analyser).unwrap() as *const dyn StructuredBody as *const ();
            let second = method.analysis(&analyser).unwrap() as *const dyn StructuredBody as *const ();
            assert_eq!(first, second);

            method.release_code();
            assert!(method.body().is_released());
            assert!(method.attributes().is_empty());
            let err = method.analysis(&analyser).unwrap_err();
            assert!(matches!(err.root(), EntityError::CodeReleased(name) if name == "run"));
            match err {
                EntityError::InMember { member, .. } => assert_eq!("p.A.run()V", member),
                e => panic!("unexpected error {:?}", e),
            }
        },
    );
}

#[test]
fn test_dump_after_release_fails() {
    with_method(class("p/A"), |r| r.code(&[]), ACC_PUBLIC, "run", "()V", |mut method| {
        let analyser = FakeAnalyser::default();
        method.analyse(&analyser).unwrap();
        method.release_code();

        let mut d = StringDumper::new();
        let err = method.dump(&mut d, false, &analyser).unwrap_err();
        assert!(matches!(err.root(), EntityError::CodeReleased(name) if name == "run"));
        assert_eq!("", d.as_str());
    });
}

#[test]
fn test_abstract_method_has_no_code() {
    with_method(class("p/A"), |r| r, 0x0401, "run", "()V", |method| {
        assert!(!method.has_code());
        let err = method.analysis(&FakeAnalyser::default()).unwrap_err();
        assert!(matches!(err.root(), EntityError::NoCode(_)));
        // Nothing to analyse is not a failure for the whole method.
        method.analyse(&FakeAnalyser::default()).unwrap();
        assert_eq!("public abstract void run();\n", render(&method, false));
    });
}

#[test]
fn test_analyse_reports_failures_with_member() {
    struct FailingAnalyser;
    impl CodeAnalyser for FailingAnalyser {
        fn analyse(
            &self,
            _code: &CodeAttribute,
            _local_classes: &mut LocalClassRegistry,
        ) -> unbrew_entities::Result<Box<dyn StructuredBody>> {
            Err(EntityError::Analysis("unreachable block".into()))
        }
    }

    with_method(class("p/A"), |r| r.code(&[]), ACC_PUBLIC, "run", "()V", |method| {
        let err = method.analyse(&FailingAnalyser).unwrap_err();
        assert_eq!(
            "While processing p.A.run()V: Code analysis failed: unreachable block",
            err.to_string()
        );
    });
}

#[test]
fn test_synthetic_flag_union() {
    with_method(
        class("p/A"),
        |r| r.attribute("Synthetic", &[]),
        ACC_STATIC,
        "access$000",
        "()V",
        |method| {
            assert!(method.is_synthetic());
            assert!(method.test_access_flag(MethodAccessFlags::SYNTHETIC));
        },
    );
}

#[test]
fn test_bridge_methods_start_hidden() {
    with_method(class("p/A"), |r| r, 0x1041, "get", "()Ljava/lang/Object;", |method| {
        assert_eq!(HiddenState::HiddenBridge, method.hidden_state())
    });
    with_method(class("p/A"), |r| r, 0x1049, "get", "()Ljava/lang/Object;", |method| {
        assert_eq!(HiddenState::Visible, method.hidden_state())
    });

    let options = MemberOptions {
        hide_bridge_methods: false,
        ..MemberOptions::default()
    };
    with_method_options(
        class("p/A"),
        |r| r,
        0x1041,
        "get",
        "()Ljava/lang/Object;",
        options,
        |mut method| {
            assert_eq!(HiddenState::Visible, method.hidden_state());
            method.hide_synthetic();
            assert_eq!(HiddenState::HiddenSynthetic, method.hidden_state());
        },
    );
}

#[test]
fn test_thrown_types() {
    with_method(
        class("p/A"),
        |r| r.exceptions(&["java/io/IOException", "java/lang/InterruptedException"]),
        0x0401,
        "read",
        "()I",
        |method| {
            let thrown = method.thrown_types().iter().cloned().collect::<Vec<_>>();
            assert_eq!(
                vec![
                    JavaType::class("java/io/IOException"),
                    JavaType::class("java/lang/InterruptedException")
                ],
                thrown
            );
            assert!(ptr::eq(method.thrown_types(), method.thrown_types()));
            assert_eq!(
                "public abstract int read() throws java.io.IOException, java.lang.InterruptedException;\n",
                render(&method, false)
            );
        },
    );
}

#[test]
fn test_generic_thrown_types() {
    with_method(
        class("p/A"),
        |r| {
            r.signature("<X:Ljava/lang/Exception;>()V^TX;")
                .exceptions(&["java/lang/Exception"])
        },
        0x0401,
        "fail",
        "()V",
        |method| {
            assert_eq!(
                vec![&JavaType::TypeVariable("X".into())],
                method.thrown_types().iter().collect::<Vec<_>>()
            );
            assert_eq!(
                "public abstract <X extends java.lang.Exception> void fail() throws X;\n",
                render(&method, false)
            );
        },
    );
}

#[test]
fn test_dump_with_override_and_annotations() {
    with_method(
        class("p/A"),
        |r| {
            r.annotations(&["Ljava/lang/Deprecated;"])
                .code(&[("this", "Lp/A;", 0), ("a", "I", 1), ("b", "I", 2)])
        },
        ACC_PUBLIC,
        "add",
        "(II)I",
        |mut method| {
            method.mark_override();
            let mut comments = DecompilerComments::new();
            comments.add("Loop structure could not be fully recovered");
            method.set_comments(comments);
            assert_eq!(
                "/* Loop structure could not be fully recovered */\n\
                 @Override\n\
                 @java.lang.Deprecated\n\
                 public int add(int a, int b) {\n// 1 instructions\n}\n",
                render(&method, false)
            );
        },
    );
}

#[test]
fn test_dump_varargs() {
    with_method(
        class("p/A"),
        |r| r,
        0x0189,
        "format",
        "([Ljava/lang/Object;)Ljava/lang/String;",
        |method| {
            assert!(method.is_varargs());
            assert_eq!(
                "public static native java.lang.String format(java.lang.Object... arg0);\n",
                render(&method, false)
            );
        },
    );
}

#[test]
fn test_dump_interface_default_method() {
    with_method(class("p/I"), |r| r.code(&[]), ACC_PUBLIC, "run", "()V", |method| {
        assert_eq!(
            "public default void run() {\n// 1 instructions\n}\n",
            render(&method, true)
        );
    });
    with_method(class("p/I"), |r| r, 0x0401, "stop", "()V", |method| {
        assert_eq!("public void stop();\n", render(&method, true));
    });
}

#[test]
fn test_dump_annotation_element_default() {
    with_method(
        class("p/Timeout"),
        |r| r.annotation_default_int(5),
        0x0401,
        "value",
        "()I",
        |method| {
            assert!(method.body().default_value().is_some());
            assert_eq!("public int value() default 5;\n", render(&method, true));
        },
    );
}

#[test]
fn test_local_classes() {
    with_method(class("p/A"), |r| r.code(&[]), ACC_PUBLIC, "run", "()V", |method| {
        method
            .mark_used_local_class(&JavaType::class("p/A$1Helper"), Some("Helper".into()))
            .unwrap();
        let err = method
            .mark_used_local_class(&JavaType::Raw(RawType::Int), None)
            .unwrap_err();
        assert!(matches!(err.root(), EntityError::InvalidLocalClass(_)));

        let analyser = FakeAnalyser {
            local_classes: vec![("p/A$2", None), ("p/A$1Helper", None)],
        };
        method.analyse(&analyser).unwrap();

        let local_classes = method.local_classes();
        assert_eq!(
            vec![&RefType::new("p/A$1Helper"), &RefType::new("p/A$2")],
            local_classes.classes().collect::<Vec<_>>()
        );
        assert_eq!(
            Some("Helper"),
            local_classes.suggested_name(&RefType::new("p/A$1Helper"))
        );
    });
}

#[test]
fn test_copy_local_classes() {
    init_logger();
    let mut pool = PoolBuilder::new();
    let a = RecordBuilder::new(&mut pool, ACC_PUBLIC, "a", "()V").build();
    let b = RecordBuilder::new(&mut pool, ACC_PUBLIC, "b", "()V").build();
    let cp = pool.build();
    let parse = |raw: &[u8]| {
        Method::parse(
            raw,
            &cp,
            unbrew_class_file::ClassFileVersion::JAVA_8,
            &unbrew_class_file::StandardAttributeFactory,
            class("p/A"),
            MemberOptions::default(),
        )
        .unwrap()
    };
    let a = parse(&a);
    let b = parse(&b);

    assert!(!a.copy_local_classes_from(&b));
    b.mark_used_local_class(&JavaType::class("p/A$1"), None)
        .unwrap();
    assert!(a.copy_local_classes_from(&b));
    assert!(a.copy_local_classes_from(&b));
    assert_eq!(1, a.local_classes().len());
    assert!(a.copy_local_classes_from(&a));
    assert_eq!(1, a.local_classes().len());
}

#[test]
fn test_collect_type_usages() {
    with_method(
        class("p/A"),
        |r| {
            r.annotations(&["Lp/Marker;"])
                .exceptions(&["java/io/IOException"])
                .code(&[])
        },
        ACC_PUBLIC,
        "load",
        "(Ljava/util/Map;)Lp/Result;",
        |method| {
            method
                .mark_used_local_class(&JavaType::class("p/A$1"), None)
                .unwrap();
            let mut usages = TypeUsageSet::new();
            method.collect_type_usages(&mut usages).unwrap();
            for name in ["java/util/Map", "p/Result", "p/Marker", "java/io/IOException", "p/A$1"] {
                assert!(usages.contains(&RefType::new(name)), "missing {}", name);
            }
            assert_eq!(5, usages.len());
        },
    );
}

#[test]
fn test_raw_length_covers_code() {
    init_logger();
    let mut pool = PoolBuilder::new();
    let raw = RecordBuilder::new(&mut pool, ACC_PUBLIC, "run", "()V")
        .code(&[])
        .build();
    let method = parse_method(pool, &raw, class("p/A"), MemberOptions::default()).unwrap();
    assert_eq!(raw.len(), method.raw_length());
    assert!(method.attributes().get("Code").is_none());
    assert!(method.body().code().is_some());
}
