//! macOS system framework probe.

use crate::probe::capability::{Capability, CapabilityRecord};
use crate::toolchain::CompileJob;

/// Frameworks linked by the `osx-frameworks` capability.
pub const OSX_FRAMEWORKS: &[&str] = &[
    "CoreFoundation",
    "Security",
    "SystemConfiguration",
    "Foundation",
];

const FRAMEWORKS_FRAGMENT: &str = r#"#include <CoreFoundation/CoreFoundation.h>
#include <Security/Security.h>
#include <SystemConfiguration/SystemConfiguration.h>

int
main()
{
  CFStringRef s = CFStringCreateWithCString(kCFAllocatorDefault, "probe", kCFStringEncodingUTF8);
  CFRelease(s);
  return 0;
}
"#;

/// The compile job linking every framework.
pub fn frameworks_job() -> CompileJob {
    let mut job = CompileJob::new(FRAMEWORKS_FRAGMENT);
    job.frameworks = OSX_FRAMEWORKS.iter().map(|f| f.to_string()).collect();
    job
}

/// The record registered when the frameworks link.
pub fn frameworks_record() -> CapabilityRecord {
    CapabilityRecord {
        include_path: None,
        library_names: OSX_FRAMEWORKS.iter().map(|f| f.to_string()).collect(),
        library_path: None,
        version: None,
        extra_flags: Vec::new(),
        define: Capability::OsxFrameworks.define_name(),
        defined: true,
    }
}
