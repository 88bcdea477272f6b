//! Compiler-feature checks.
//!
//! A feature check compiles a fragment and, if it builds, sets a
//! preprocessor define. Failure only means the define stays unset.

use crate::config::FeatureConfig;
use crate::toolchain::{CompileJob, Platform, TargetOs};

/// One compiler-feature check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCheck {
    /// Define set on success, e.g. `HAVE_STD_TO_STRING`.
    pub define: String,
    /// Label for progress output.
    pub description: String,
    pub fragment: String,
    /// Extra compiler flags for this check.
    pub flags: Vec<String>,
    /// Restrict the check to one operating system.
    pub only_on: Option<TargetOs>,
}

impl FeatureCheck {
    /// Whether this check should run for `host`.
    pub fn applies_to(&self, host: &Platform) -> bool {
        self.only_on.map_or(true, |os| os == host.os())
    }

    /// The compile job for this check.
    pub fn job(&self) -> CompileJob {
        let mut job = CompileJob::new(self.fragment.clone());
        job.extra_flags = self.flags.clone();
        job
    }
}

impl From<&FeatureConfig> for FeatureCheck {
    fn from(config: &FeatureConfig) -> Self {
        Self {
            define: config.define.clone(),
            description: config
                .description
                .clone()
                .unwrap_or_else(|| config.define.clone()),
            fragment: config.fragment.clone(),
            flags: config.flags.clone(),
            only_on: None,
        }
    }
}

/// The built-in compiler-feature checks.
pub fn builtin_features() -> Vec<FeatureCheck> {
    vec![
        FeatureCheck {
            define: "HAVE_STD_TO_STRING".to_string(),
            description: "std::to_string".to_string(),
            fragment: r#"#include <string>

int
main()
{
  std::string s = std::to_string(0);
  return s.empty() ? 1 : 0;
}
"#
            .to_string(),
            flags: vec![],
            only_on: None,
        },
        FeatureCheck {
            define: "HAVE_VECTOR_INSERT_ERASE_CONST_ITERATOR".to_string(),
            description: "std::vector::insert with const_iterator".to_string(),
            fragment: r#"#include <vector>

int
main()
{
  std::vector<int> v;
  std::vector<int>::const_iterator it = v.cbegin();
  v.insert(it, 2);
  it = v.cend() - 1;
  v.erase(it);
  return 0;
}
"#
            .to_string(),
            flags: vec![],
            only_on: None,
        },
        FeatureCheck {
            define: "HAVE_IS_NOTHROW_MOVE_CONSTRUCTIBLE".to_string(),
            description: "std::is_nothrow_move_constructible".to_string(),
            fragment: r#"#include <type_traits>

struct Good { Good(Good&&) noexcept; };
struct Bad { Bad(Bad&&); };

static_assert(std::is_nothrow_move_constructible<Good>::value, "");
static_assert(!std::is_nothrow_move_constructible<Bad>::value, "");

int
main()
{
  return 0;
}
"#
            .to_string(),
            flags: vec![],
            only_on: None,
        },
        FeatureCheck {
            define: "HAVE_GETPASS".to_string(),
            description: "getpass()".to_string(),
            fragment: r#"#include <unistd.h>

int
main()
{
  char* (*fn)(const char*) = &getpass;
  return fn == nullptr ? 1 : 0;
}
"#
            .to_string(),
            flags: vec![],
            only_on: None,
        },
        FeatureCheck {
            define: "HAVE_NETLINK".to_string(),
            description: "netlink sockets".to_string(),
            fragment: r#"#include <linux/netlink.h>
#include <linux/rtnetlink.h>
#include <sys/socket.h>

int
main()
{
  return socket(AF_NETLINK, SOCK_RAW, NETLINK_ROUTE) >= 0 ? 0 : 0;
}
"#
            .to_string(),
            flags: vec![],
            only_on: Some(TargetOs::Linux),
        },
    ]
}
