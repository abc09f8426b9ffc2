/// Cached listing plus invalidation for a collection client.
///
/// The client needs `api` (exposing `list_<plural>`) and `cache` fields, and
/// its error type must convert from `ApiError`.
#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $error:ty, $plural:ident, $key:ident) => {
        paste::paste! {
            impl $client_name {
                /// Cached listing; refetched after any mutation through this client.
                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $plural>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.cache
                        .get_or_fetch($crate::cache::CollectionKey::$key, || self.api.[<list_ $plural>]())
                        .await
                        .map_err(<$error>::from)
                }

                pub async fn [<invalidate_ $plural>](&self) {
                    self.cache.invalidate($crate::cache::CollectionKey::$key).await;
                }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_client_new {
    ($client_name:ident, $api:ident) => {
        impl $client_name {
            pub fn new(
                api: std::sync::Arc<dyn $api>,
                cache: $crate::cache::QueryCache,
                notifier: std::sync::Arc<dyn $crate::notify::Notifier>,
            ) -> Self {
                Self { api, cache, notifier }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_basic_client {
    ($client_name:ident, $api:ident, $entity:ty, $error:ty, $plural:ident, $key:ident) => {
        $crate::impl_client_new!($client_name, $api);
        $crate::impl_client_methods!($client_name, $entity, $error, $plural, $key);
    };
}

/// Notifies a failed mutation with the server's message, or `$fallback`.
#[macro_export]
macro_rules! notify_failure {
    ($notifier:expr, $error:expr, $fallback:expr) => {{
        let error: &$crate::error::ApiError = $error;
        tracing::error!(error = %error, "{}", $fallback);
        $notifier.error(error.server_message().unwrap_or($fallback));
    }};
}
