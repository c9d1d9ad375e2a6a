//! Assembles the full deployment graph from a validated stack configuration.
//!
//! Declaration order follows the data flow: table, execution role, inline
//! policy, dependency layer, function, then the HTTP surface, and the invoke
//! permission last. The same configuration always produces a byte-identical
//! graph.

use std::path::Path;

use indexmap::IndexMap;

use crate::core::expr::{self, Expr};
use crate::core::graph::{ResourceGraph, ResourceNode};
use crate::core::namer::physical_name;
use crate::core::types::StackConfig;
use crate::resources::apigateway::{
    ApiResourceSpec, DeploymentSpec, IntegrationSpec, MethodSpec, RestApiSpec,
};
use crate::resources::artifact::ArchiveArtifact;
use crate::resources::iam::{
    assume_role_policy_for_service, PolicyDocument, PolicyStatement, RolePolicySpec, RoleSpec,
};
use crate::resources::lambda::{FunctionSpec, LayerVersionSpec, PermissionSpec};
use crate::resources::table::TableSpec;
use crate::resources::NodeSpec;

/// Graph-local node ids, stable across builds.
pub mod ids {
    pub const TABLE: &str = "table";
    pub const EXECUTION_ROLE: &str = "execution-role";
    pub const ROLE_POLICY: &str = "role-policy";
    pub const LAYER: &str = "layer";
    pub const FUNCTION: &str = "function";
    pub const REST_API: &str = "rest-api";
    pub const API_RESOURCE: &str = "api-resource";
    pub const API_METHOD: &str = "api-method";
    pub const API_INTEGRATION: &str = "api-integration";
    pub const API_DEPLOYMENT: &str = "api-deployment";
    pub const INVOKE_PERMISSION: &str = "invoke-permission";
}

const FUNCTION_SERVICE_PRINCIPAL: &str = "lambda.amazonaws.com";
const API_SERVICE_PRINCIPAL: &str = "apigateway.amazonaws.com";

/// Environment variable binding the table name into the function.
pub const TABLE_ENV_VAR: &str = "DYNAMODB_TABLE";

fn environment_tags(stack: &str) -> IndexMap<String, String> {
    let mut tags = IndexMap::new();
    tags.insert("Environment".to_string(), stack.to_string());
    tags
}

/// Build the desired-state graph for one stack.
///
/// Archive paths in the configuration resolve against `build_root`. The
/// returned graph still carries account placeholders; call
/// [`ResourceGraph::finalize`] with a resolved identity to substitute them.
pub fn build_graph(config: &StackConfig, build_root: &Path) -> Result<ResourceGraph, String> {
    let ctx = config.context()?;
    let mut graph = ResourceGraph::new();

    let table_name = physical_name(&ctx, None);
    graph.declare(ResourceNode {
        id: ids::TABLE.to_string(),
        name: table_name.clone(),
        spec: NodeSpec::Table(TableSpec::new(
            &config.table.hash_key,
            config.table.read_capacity,
            config.table.write_capacity,
            environment_tags(&ctx.stack),
        )),
        depends_on: Vec::new(),
    })?;

    let role_name = physical_name(&ctx, Some("executionRole"));
    graph.declare(ResourceNode {
        id: ids::EXECUTION_ROLE.to_string(),
        name: role_name.clone(),
        spec: NodeSpec::Role(RoleSpec {
            assume_role_policy: assume_role_policy_for_service(FUNCTION_SERVICE_PRINCIPAL),
            tags: environment_tags(&ctx.stack),
        }),
        depends_on: Vec::new(),
    })?;

    let function_name = physical_name(&ctx, Some("createTodo"));
    let log_group_arn = Expr::template(format!(
        "arn:aws:logs:{}:{}:log-group:/aws/lambda/{}*",
        expr::REGION,
        expr::ACCOUNT_ID,
        function_name
    ));
    let table_arn = Expr::template(format!(
        "arn:aws:dynamodb:{}:{}:table/{}",
        expr::REGION,
        expr::ACCOUNT_ID,
        table_name
    ));
    graph.declare(ResourceNode {
        id: ids::ROLE_POLICY.to_string(),
        name: format!("{}-policy", role_name),
        spec: NodeSpec::RolePolicy(RolePolicySpec {
            role: Expr::output(ids::EXECUTION_ROLE, "id"),
            policy: PolicyDocument::new(vec![
                PolicyStatement::allow(
                    &[
                        "logs:CreateLogGroup",
                        "logs:CreateLogStream",
                        "logs:PutLogEvents",
                    ],
                    log_group_arn,
                ),
                PolicyStatement::allow(
                    &[
                        "dynamodb:Query",
                        "dynamodb:Scan",
                        "dynamodb:GetItem",
                        "dynamodb:PutItem",
                        "dynamodb:UpdateItem",
                        "dynamodb:DeleteItem",
                    ],
                    table_arn,
                ),
            ]),
        }),
        depends_on: Vec::new(),
    })?;

    graph.declare(ResourceNode {
        id: ids::LAYER.to_string(),
        name: physical_name(&ctx, Some("lambda-layer-nodemodules")),
        spec: NodeSpec::LayerVersion(LayerVersionSpec {
            compatible_runtimes: vec![config.function.runtime.clone()],
            code: ArchiveArtifact::at(build_root, &config.function.layer)?,
        }),
        depends_on: Vec::new(),
    })?;

    let mut environment = IndexMap::new();
    environment.insert(TABLE_ENV_VAR.to_string(), Expr::literal(table_name.as_str()));
    graph.declare(ResourceNode {
        id: ids::FUNCTION.to_string(),
        name: function_name.clone(),
        spec: NodeSpec::Function(FunctionSpec {
            runtime: config.function.runtime.clone(),
            handler: config.function.handler.clone(),
            role: Expr::output(ids::EXECUTION_ROLE, "arn"),
            code: ArchiveArtifact::at(build_root, &config.function.code)?,
            layers: vec![Expr::output(ids::LAYER, "arn")],
            memory_size: config.function.memory_size,
            environment,
            tags: environment_tags(&ctx.stack),
        }),
        depends_on: Vec::new(),
    })?;

    graph.declare(ResourceNode {
        id: ids::REST_API.to_string(),
        name: physical_name(&ctx, Some("rest")),
        spec: NodeSpec::RestApi(RestApiSpec { description: None }),
        depends_on: Vec::new(),
    })?;

    graph.declare(ResourceNode {
        id: ids::API_RESOURCE.to_string(),
        name: physical_name(&ctx, Some("resource")),
        spec: NodeSpec::ApiResource(ApiResourceSpec {
            rest_api: Expr::output(ids::REST_API, "id"),
            parent_id: Expr::output(ids::REST_API, "root_resource_id"),
            path_part: config.api.path_part.clone(),
        }),
        depends_on: Vec::new(),
    })?;

    graph.declare(ResourceNode {
        id: ids::API_METHOD.to_string(),
        name: physical_name(&ctx, Some("method")),
        spec: NodeSpec::Method(MethodSpec {
            rest_api: Expr::output(ids::REST_API, "id"),
            resource_id: Expr::output(ids::API_RESOURCE, "id"),
            http_method: "POST".to_string(),
            authorization: "NONE".to_string(),
        }),
        depends_on: Vec::new(),
    })?;

    graph.declare(ResourceNode {
        id: ids::API_INTEGRATION.to_string(),
        name: physical_name(&ctx, Some("integration-post")),
        spec: NodeSpec::Integration(IntegrationSpec {
            rest_api: Expr::output(ids::REST_API, "id"),
            resource_id: Expr::output(ids::API_RESOURCE, "id"),
            http_method: "POST".to_string(),
            integration_http_method: "POST".to_string(),
            integration_type: "AWS_PROXY".to_string(),
            uri: Expr::output(ids::FUNCTION, "invoke_arn"),
        }),
        depends_on: Vec::new(),
    })?;

    // The stage-to-integration ordering is not expressible as a data
    // reference, so it rides on a structural edge.
    graph.declare(ResourceNode {
        id: ids::API_DEPLOYMENT.to_string(),
        name: physical_name(&ctx, Some("deployment")),
        spec: NodeSpec::Deployment(DeploymentSpec {
            rest_api: Expr::output(ids::REST_API, "id"),
            stage_name: ctx.stack.clone(),
        }),
        depends_on: vec![ids::API_INTEGRATION.to_string()],
    })?;

    graph.declare(ResourceNode {
        id: ids::INVOKE_PERMISSION.to_string(),
        name: format!("{}-permission", function_name),
        spec: NodeSpec::Permission(PermissionSpec {
            statement_id: "AllowAPIGatewayInvoke".to_string(),
            action: "lambda:InvokeFunction".to_string(),
            function: Expr::output(ids::FUNCTION, "name"),
            principal: API_SERVICE_PRINCIPAL.to_string(),
            source_arn: Expr::template(format!(
                "{{{{out:{}.execution_arn}}}}/*/*",
                ids::REST_API
            )),
        }),
        depends_on: Vec::new(),
    })?;

    graph.export(
        "api_url",
        Expr::template(format!(
            "https://{{{{out:{}.id}}}}.execute-api.{}.amazonaws.com/{}",
            ids::REST_API,
            expr::REGION,
            ctx.stack
        )),
    )?;

    Ok(graph)
}
