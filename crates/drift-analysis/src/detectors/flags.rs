//! Function flags persisted to the store: entry point, test, auth handler,
//! data accessor, injectable. Shared between the pipeline's function
//! ingestion and the call graph's node construction.

use crate::parsers::types::FunctionInfo;
use crate::parsers::ParseResult;

use super::api::ApiRouteDetector;
use super::auth::AuthDetector;
use super::data_access::DataAccessDetector;
use super::testing::test_framework_of;

pub fn is_entry_point(function: &FunctionInfo) -> bool {
    ApiRouteDetector::is_route_handler(&function.decorators) || function.name == "main"
}

pub fn is_test(function: &FunctionInfo, parse: &ParseResult) -> bool {
    test_framework_of(function, parse).is_some()
}

pub fn is_auth_handler_fn(function: &FunctionInfo) -> bool {
    AuthDetector::is_auth_handler(&function.decorators, &function.name)
}

/// A function is a data accessor when any call site inside its line range
/// looks like a data access.
pub fn is_data_accessor(function: &FunctionInfo, parse: &ParseResult) -> bool {
    parse.call_sites.iter().any(|call| {
        call.caller.as_deref() == Some(function.qualified_name.as_str())
            && DataAccessDetector::is_data_access(&call.name, call.receiver.as_deref())
    })
}

/// Methods of DI-annotated classes are injectable.
pub fn is_injectable(function: &FunctionInfo, parse: &ParseResult) -> bool {
    if !function.is_method {
        return false;
    }
    let Some(class_name) = function.qualified_name.split('.').next() else {
        return false;
    };
    parse.classes.iter().any(|class| {
        class.name == class_name
            && class.decorators.iter().any(|d| {
                d.contains("Injectable") || d.contains("Inject") || d.contains("Autowired")
            })
    })
}
